use serde_json::{Map, Value};
use thiserror::Error;

use crate::envelope::Envelope;

/// Code attached to failures raised before any network call.
pub const VALIDATION_CODE: u16 = 400;

/// Every way an apiglue operation can fail.
///
/// The variant is decided where the failure is caught; [`Failure::normalize`]
/// then turns it into the uniform [`Envelope`] error shape.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    /// The provider answered with a non-2xx status (or an embedded error
    /// code). Status and body are kept verbatim.
    #[error("HTTP {status}: {message}")]
    Transport {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// A required argument or setting is missing or out of range.
    #[error("{message}")]
    Validation { message: String },

    /// A failure that has already been converted into an envelope.
    #[error("{0}")]
    Normalized(Envelope),

    /// Anything else: connection problems, undecodable payloads, bugs.
    #[error("{name}: {message}")]
    Unexpected { name: String, message: String },

    /// One chunk of a chunked batch failed; remaining chunks were skipped.
    #[error("failed performing action in iteration {iteration}: {source}")]
    Batch {
        iteration: usize,
        #[source]
        source: Box<Failure>,
    },
}

impl Failure {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unexpected(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unexpected {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Validation failure for a required parameter that was not passed.
    pub fn not_passed(property: &str) -> Self {
        Self::validation(format!(
            "{property} parameter is not provided with the request."
        ))
    }

    /// Status code the failure will carry once normalized.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            Self::Validation { .. } | Self::Unexpected { .. } => Some(VALIDATION_CODE),
            Self::Normalized(envelope) => envelope.code,
            Self::Batch { source, .. } => source.code(),
        }
    }

    /// Convert into the envelope error shape.
    ///
    /// Transport failures keep the provider status and body, already
    /// normalized envelopes pass through untouched, and everything else is
    /// reported with code 400.
    pub fn normalize(self) -> Envelope {
        match self {
            Self::Transport {
                status,
                message,
                body,
            } => Envelope::new(false, Some(status), Some(message), body, None),
            Self::Normalized(envelope) => envelope,
            Self::Validation { message } => Envelope::failure(VALIDATION_CODE, message),
            Self::Unexpected { name, message } => {
                let mut extra = Map::new();
                extra.insert("errorName".to_owned(), Value::String(name));
                Envelope::new(
                    false,
                    Some(VALIDATION_CODE),
                    Some(message),
                    None,
                    Some(extra),
                )
            }
            Self::Batch { iteration, source } => {
                let inner = source.normalize();
                Envelope::new(
                    false,
                    inner.code,
                    Some(format!("Failed performing action in iteration {iteration}")),
                    Some(inner.to_value()),
                    None,
                )
            }
        }
    }

    /// Normalize and re-wrap, so the failure can keep propagating with `?`.
    #[must_use]
    pub fn into_normalized(self) -> Self {
        match self {
            Self::Normalized(_) => self,
            other => Self::Normalized(other.normalize()),
        }
    }
}

impl From<Failure> for Envelope {
    fn from(failure: Failure) -> Self {
        failure.normalize()
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Self::unexpected("SerializationError", err.to_string())
    }
}
