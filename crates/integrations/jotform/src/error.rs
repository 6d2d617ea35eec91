use apiglue_core::Failure;
use serde_json::Value;
use thiserror::Error;

/// Errors specific to the Jotform provider.
///
/// These are internal errors that get converted into [`Failure`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum JotformError {
    /// A required argument was not passed or was empty.
    #[error("{0} parameter is not provided with the request.")]
    MissingParameter(&'static str),

    /// A required configuration value is empty.
    #[error(
        "{0} property is not set yet nor passed, you either pass it or alternatively \
         use settings.jotform.set_{0} to configure it first."
    )]
    NotConfigured(&'static str),

    /// A form-level operation was called without a form id.
    #[error(
        "form_id property is not set yet nor passed, you either pass it or alternatively \
         use settings.jotform.set_form_id to configure it first."
    )]
    NoFormId,

    /// Jotform answered HTTP 200 but reported an error code in the body.
    #[error("Jotform API error {code}: {message}")]
    Api {
        code: u16,
        message: String,
        body: Value,
    },

    /// Jotform answered with a payload that does not have the documented shape.
    #[error("unexpected Jotform response: {0}")]
    UnexpectedResponse(String),
}

impl From<JotformError> for Failure {
    fn from(err: JotformError) -> Self {
        match err {
            JotformError::MissingParameter(name) => Failure::not_passed(name),
            other @ (JotformError::NoFormId | JotformError::NotConfigured(_)) => {
                Failure::validation(other.to_string())
            }
            JotformError::Api {
                code,
                message,
                body,
            } => Failure::Transport {
                status: code,
                message,
                body: Some(body),
            },
            JotformError::UnexpectedResponse(msg) => Failure::unexpected("UnexpectedResponse", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn api_error_keeps_embedded_code_and_body() {
        let failure: Failure = JotformError::Api {
            code: 401,
            message: "You're not authorized to use (form-id)".into(),
            body: json!({"responseCode": 401}),
        }
        .into();
        let env = failure.normalize();
        assert_eq!(env.code, Some(401));
        assert_eq!(env.body.unwrap()["responseCode"], 401);
    }

    #[test]
    fn no_form_id_names_setter() {
        let env = Failure::from(JotformError::NoFormId).normalize();
        assert_eq!(env.code, Some(400));
        assert!(env.message.unwrap().contains("set_form_id"));
    }

    #[test]
    fn error_display() {
        let err = JotformError::MissingParameter("submission_id");
        assert_eq!(
            err.to_string(),
            "submission_id parameter is not provided with the request."
        );
    }
}
