//! In-memory transport for tests.
//!
//! Responses are queued up front and handed out in order; every request
//! that goes through the transport is recorded for later assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;
use tokio::time::Instant;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

/// A request observed by [`ScriptedTransport`], with the (possibly paused)
/// tokio clock reading at the time it was sent.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub request: HttpRequest,
    pub at: Instant,
}

/// Transport that replays scripted responses.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response. Non-2xx statuses are replayed as
    /// [`TransportError::Status`], like a real transport would.
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        let response = if (200..300).contains(&status) {
            Ok(HttpResponse::new(status, body))
        } else {
            Err(TransportError::status(status, body))
        };
        self.push(response)
    }

    /// Queue a transport-level error.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    fn push(&self, response: Result<HttpResponse, TransportError>) -> &Self {
        self.responses
            .lock()
            .expect("scripted transport mutex poisoned")
            .push_back(response);
        self
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.recorded().into_iter().map(|r| r.request).collect()
    }

    /// Every request sent so far, with timestamps.
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("scripted transport mutex poisoned")
            .clone()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .expect("scripted transport mutex poisoned")
            .len()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .expect("scripted transport mutex poisoned")
            .len()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("scripted transport mutex poisoned")
            .push(RecordedRequest {
                request,
                at: Instant::now(),
            });
        self.responses
            .lock()
            .expect("scripted transport mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted response left".into())))
    }
}
