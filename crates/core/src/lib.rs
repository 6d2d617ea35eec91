//! Shared building blocks for the apiglue provider crates.
//!
//! Every provider operation answers with an [`Envelope`], and every failure
//! is a [`Failure`] that normalizes into the same envelope shape. Default
//! credentials and identifiers live in an explicit [`Settings`] value.

pub mod envelope;
pub mod error;
pub mod general;
pub mod settings;

pub use envelope::{Cursor, Envelope, OFFSET_KEY};
pub use error::{Failure, VALIDATION_CODE};
pub use general::endpoint_not_supported;
pub use settings::{
    AirtableSettings, DEFAULT_AIRTABLE_BASE_URL, DEFAULT_AIRTABLE_REQUEST_DELAY_MS,
    GeneralSettings, JotformSettings, Namespace, Settings,
};
