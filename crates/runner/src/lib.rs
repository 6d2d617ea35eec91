//! Sequential work runners used by apiglue providers.
//!
//! - [`run_chunked`] splits a bulk job into provider-sized slices and runs
//!   them one at a time with a fixed pause between requests.
//! - [`retry_until`] polls an action until a predicate accepts the result.
//! - [`walk_pages`] follows continuation cursors and concatenates pages.
//!
//! None of them run two units of work at once.

pub mod chunk;
pub mod config;
pub mod pagination;
pub mod retry;

pub use chunk::{concat_bodies, run_chunked};
pub use config::RunnerConfig;
pub use pagination::walk_pages;
pub use retry::retry_until;
