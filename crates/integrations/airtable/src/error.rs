use apiglue_core::Failure;
use thiserror::Error;

/// Errors specific to the Airtable provider.
///
/// These are internal errors that get converted into [`Failure`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum AirtableError {
    /// A required argument was not passed or was empty.
    #[error("{0} parameter is not provided with the request.")]
    MissingParameter(&'static str),

    /// `maxRecords` outside of what a single list call accepts.
    #[error("number of records has to be between 1 and 100 or pass none to get all the records")]
    InvalidMaxRecords(usize),

    /// A required configuration value is empty.
    #[error(
        "{0} property is not set yet nor passed, you either pass it or alternatively \
         use settings.airtable.set_{0} to configure it first."
    )]
    NotConfigured(&'static str),

    /// No table list was passed and none is configured.
    #[error(
        "tables property is not set yet nor passed, you either pass it or alternatively \
         use settings.airtable.set_tables to configure it first."
    )]
    NoTables,

    /// Airtable answered with a payload that does not have the documented shape.
    #[error("unexpected Airtable response: {0}")]
    UnexpectedResponse(String),
}

impl From<AirtableError> for Failure {
    fn from(err: AirtableError) -> Self {
        match err {
            AirtableError::MissingParameter(name) => Failure::not_passed(name),
            AirtableError::UnexpectedResponse(msg) => {
                Failure::unexpected("UnexpectedResponse", msg)
            }
            other @ (AirtableError::InvalidMaxRecords(_)
            | AirtableError::NotConfigured(_)
            | AirtableError::NoTables) => {
                Failure::validation(other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_maps_to_validation() {
        let failure: Failure = AirtableError::MissingParameter("table").into();
        let env = failure.normalize();
        assert_eq!(env.code, Some(400));
        assert_eq!(
            env.message.as_deref(),
            Some("table parameter is not provided with the request.")
        );
    }

    #[test]
    fn invalid_max_records_maps_to_validation() {
        let failure: Failure = AirtableError::InvalidMaxRecords(101).into();
        assert!(matches!(failure, Failure::Validation { .. }));
    }

    #[test]
    fn unexpected_response_keeps_error_name() {
        let env = Failure::from(AirtableError::UnexpectedResponse("no records".into())).normalize();
        assert_eq!(env.extra["errorName"], "UnexpectedResponse");
    }
}
