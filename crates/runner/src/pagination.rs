use std::future::Future;

use apiglue_core::{Cursor, Envelope, Failure};
use serde_json::Value;
use tracing::{debug, instrument};

/// Take the page body out of an envelope as a list of items.
///
/// A missing body counts as an empty page.
fn page_items(page: Envelope, number: usize) -> Result<Vec<Value>, Failure> {
    match page.body {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Failure::unexpected(
            "InvalidPageBody",
            format!("page {number} body is not a list but {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Follow continuation cursors and collect every page body into one list.
///
/// `fetch_page` is called with no cursor first, then with the cursor each
/// page reports under `offset`, until a page reports none. With a `limit`
/// the walk also stops as soon as at least `limit` items were collected and
/// the list is cut down to exactly `limit`.
///
/// The returned envelope carries the concatenated items in page order and
/// the status code of the last page fetched; it never carries a cursor. An
/// empty first page is a success with an empty list. The first failing page
/// fetch is returned as-is, without partial results.
#[instrument(skip(fetch_page))]
pub async fn walk_pages<F, Fut>(mut fetch_page: F, limit: Option<usize>) -> Result<Envelope, Failure>
where
    F: FnMut(Option<Cursor>) -> Fut,
    Fut: Future<Output = Result<Envelope, Failure>>,
{
    if limit == Some(0) {
        return Err(Failure::validation("requested count must be at least 1"));
    }

    let mut collected: Vec<Value> = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut pages = 0usize;

    let code = loop {
        let page = fetch_page(cursor.take()).await?;
        pages += 1;

        let code = page.code;
        let next = page.cursor();
        let items = page_items(page, pages)?;
        debug!(page = pages, items = items.len(), more = next.is_some(), "fetched page");

        if pages == 1 && items.is_empty() {
            return Ok(Envelope::success(code.unwrap_or(200))
                .with_message("No items found")
                .with_body(Value::Array(Vec::new())));
        }

        collected.extend(items);

        if let Some(limit) = limit
            && collected.len() >= limit
        {
            collected.truncate(limit);
            break code;
        }

        match next {
            Some(next) => cursor = Some(next),
            None => break code,
        }
    };

    debug!(pages, total = collected.len(), "pagination complete");
    let message = format!("Retrieved {} items across {pages} pages", collected.len());
    Ok(Envelope::success(code.unwrap_or(200))
        .with_message(message)
        .with_body(Value::Array(collected)))
}
