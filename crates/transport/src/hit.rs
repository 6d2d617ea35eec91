//! Plain, unauthenticated requests to arbitrary URLs.

use apiglue_core::{Envelope, Failure, Namespace, Settings};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::http::{HttpMethod, HttpRequest};
use crate::transport::Transport;

fn with_body(request: HttpRequest, body: Option<Value>) -> HttpRequest {
    match body {
        Some(body) if request.method != HttpMethod::Get => request.with_json(body),
        _ => request,
    }
}

/// Hit a URL of an outside service, e.g. a webhook with non-sensitive data.
///
/// The response body is returned verbatim inside a success envelope.
#[instrument(skip(transport, body))]
pub async fn hit_url<T: Transport>(
    transport: &T,
    url: &str,
    method: HttpMethod,
    body: Option<Value>,
) -> Result<Envelope, Failure> {
    if url.is_empty() {
        return Err(Failure::not_passed("url"));
    }

    let request = with_body(HttpRequest::new(method, url), body);
    let response = transport
        .send(request)
        .await
        .map_err(|e| Failure::from(e).into_normalized())?;

    debug!(status = response.status, "url hit");

    Ok(Envelope::success(response.status)
        .with_message(format!("Successfully hit {url}"))
        .with_body(response.body))
}

/// Hit an endpoint of the calling service itself.
///
/// The service is expected to answer with an envelope of its own; an answer
/// whose `success` flag is not `true` is reported as a failure.
#[instrument(skip(transport, settings, body))]
pub async fn hit_in_house_endpoint<T: Transport>(
    transport: &T,
    settings: &Settings,
    endpoint: &str,
    method: HttpMethod,
    body: Option<Value>,
) -> Result<Envelope, Failure> {
    let base_url = settings.require(Namespace::General, "in_house_base_url")?;
    let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
    let url = format!("{}/{endpoint}", base_url.trim_end_matches('/'));

    let request = with_body(HttpRequest::new(method, url), body);
    let response = transport
        .send(request)
        .await
        .map_err(|e| Failure::from(e).into_normalized())?;

    let data = response.body;
    let code = data
        .get("code")
        .and_then(Value::as_u64)
        .and_then(|c| u16::try_from(c).ok());

    if data.get("success").and_then(Value::as_bool) == Some(true) {
        debug!(endpoint, "in-house endpoint hit");
        Ok(Envelope::new(
            true,
            code,
            Some(format!("Successfully hit the endpoint /{endpoint}")),
            Some(data),
            None,
        ))
    } else {
        Err(Failure::Normalized(Envelope::new(
            false,
            code,
            Some(format!("Error returned on hitting endpoint {endpoint}")),
            Some(data),
            None,
        )))
    }
}
