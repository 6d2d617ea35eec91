use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP request.
///
/// Implementations return the status and parsed body for 2xx responses and
/// a [`TransportError`] for everything else. Timeouts are the
/// implementation's responsibility.
///
/// This trait is **not** object-safe because it uses native `async fn`
/// methods. If you need dynamic dispatch, use [`DynTransport`] instead --
/// every `Transport` automatically implements `DynTransport`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Object-safe transport trait for use behind `Arc<dyn DynTransport>`.
#[async_trait]
pub trait DynTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + Sync> DynTransport for T {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Transport::send(self, request).await
    }
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, TransportError>> + Send {
        <T as Transport>::send(self, request)
    }
}
