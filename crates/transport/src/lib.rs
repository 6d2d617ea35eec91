//! HTTP transport capability for apiglue providers.
//!
//! Provider operations describe each call as an [`HttpRequest`] and run it
//! through a [`Transport`]. [`ReqwestTransport`] is the production
//! implementation; `ScriptedTransport` (feature `mock`) replays canned
//! responses for tests.

pub mod error;
pub mod hit;
pub mod http;
pub mod transport;

#[cfg(feature = "reqwest")]
pub mod http_client;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::TransportError;
pub use hit::{hit_in_house_endpoint, hit_url};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{DynTransport, Transport};

#[cfg(feature = "reqwest")]
pub use http_client::ReqwestTransport;

#[cfg(any(test, feature = "mock"))]
pub use mock::{RecordedRequest, ScriptedTransport};
