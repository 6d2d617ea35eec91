use apiglue_core::Failure;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a [`Transport`](crate::Transport).
///
/// These get converted into [`Failure`] at the public API boundary.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        body: Value,
    },

    /// No response was received (DNS, TLS, timeout, reset).
    #[error("connection error: {0}")]
    Connection(String),

    /// The request could not be built or the response could not be read.
    #[error("decode error: {0}")]
    Decode(String),
}

impl TransportError {
    /// A status error with the conventional message.
    pub fn status(status: u16, body: Value) -> Self {
        Self::Status {
            status,
            message: format!("Request failed with status code {status}"),
            body,
        }
    }

    /// Returns `true` for HTTP 429 responses.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }
}

impl From<TransportError> for Failure {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status {
                status,
                message,
                body,
            } => Failure::Transport {
                status,
                message,
                body: (!body.is_null()).then_some(body),
            },
            TransportError::Connection(msg) => Failure::unexpected("ConnectionError", msg),
            TransportError::Decode(msg) => Failure::unexpected("DecodeError", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_maps_to_transport_failure() {
        let failure: Failure =
            TransportError::status(404, json!({"error": "NOT_FOUND"})).into();
        let env = failure.normalize();
        assert_eq!(env.code, Some(404));
        assert_eq!(env.message.as_deref(), Some("Request failed with status code 404"));
        assert_eq!(env.body, Some(json!({"error": "NOT_FOUND"})));
    }

    #[test]
    fn connection_maps_to_unexpected_failure() {
        let failure: Failure = TransportError::Connection("reset by peer".into()).into();
        let env = failure.normalize();
        assert_eq!(env.code, Some(400));
        assert_eq!(env.extra["errorName"], "ConnectionError");
    }

    #[test]
    fn rate_limit_detection() {
        assert!(TransportError::status(429, json!(null)).is_rate_limited());
        assert!(!TransportError::status(500, json!(null)).is_rate_limited());
        assert!(!TransportError::Decode("x".into()).is_rate_limited());
    }
}
