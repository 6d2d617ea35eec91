//! Airtable records provider for apiglue.
//!
//! [`AirtableClient`] reads tables page by page through the
//! [Airtable Web API](https://airtable.com/developers/web/api/introduction)
//! and writes in chunks of ten records, pausing between requests to stay
//! under the per-base rate limit.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use apiglue_airtable::{AirtableClient, AirtableConfig};
//! use apiglue_transport::ReqwestTransport;
//!
//! # async fn run() -> Result<(), apiglue_core::Failure> {
//! let config = AirtableConfig::new("pat_XXXXXXXX", "appXXXXXXXX");
//! let transport = ReqwestTransport::new()?;
//! let client = AirtableClient::new(config, transport);
//!
//! let contacts = client.table("Contacts", None).await?;
//! println!("{contacts}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AirtableClient;
pub use config::{AirtableConfig, MAX_RECORDS_PER_REQUEST};
pub use error::AirtableError;
pub use types::{RecordUpdate, RecordsQuery};
