//! Jotform submissions provider for apiglue.
//!
//! [`JotformClient`] pages through a form's submissions, filters them by
//! flag or answer, adds and updates submissions, and polls a submission
//! until it reaches an expected state. Jotform reports some errors with a
//! `responseCode` inside an HTTP 200 answer; those come back as failures
//! carrying that code.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use apiglue_jotform::{JotformClient, JotformConfig};
//! use apiglue_transport::ReqwestTransport;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), apiglue_core::Failure> {
//! let config = JotformConfig::new("jf_XXXXXXXX").with_form_id("230001");
//! let client = JotformClient::new(config, ReqwestTransport::new()?);
//!
//! let active = client.submissions_by_flag(&json!("ACTIVE"), "status").await?;
//! println!("{active}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod types;

pub use client::JotformClient;
pub use config::{API_BASE_URL, DEFAULT_PAGE_SIZE, HIPAA_API_BASE_URL, JotformConfig};
pub use error::JotformError;
pub use filter::{filter_by_answer, filter_by_flag};
pub use types::{JotformResponse, ResultSet, fields_query_pairs};
