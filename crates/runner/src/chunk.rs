use std::future::Future;
use std::time::Duration;

use apiglue_core::{Envelope, Failure};
use serde_json::Value;
use tracing::{debug, warn};

/// Split `items` into consecutive slices of `chunk_size` and run `action`
/// over each slice, one after another.
///
/// The action receives the slice and `context`. After every slice except the
/// last the runner sleeps for `delay`, so consecutive action starts are at
/// least `delay` apart. Per-slice results are returned in slice order.
///
/// The first failing slice aborts the run: no further slices are attempted
/// and a [`Failure::Batch`] carrying the zero-based index of the failing
/// slice (which equals the number of slices that succeeded) is returned.
///
/// An empty `items` vector never invokes the action.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use apiglue_runner::run_chunked;
/// # async fn example() -> Result<(), apiglue_core::Failure> {
/// let sizes = run_chunked(
///     |chunk: Vec<u32>, _ctx: &()| async move { Ok::<_, apiglue_core::Failure>(chunk.len()) },
///     (0..23).collect(),
///     10,
///     &(),
///     Duration::from_millis(200),
/// )
/// .await?;
/// assert_eq!(sizes, vec![10, 10, 3]);
/// # Ok(())
/// # }
/// ```
pub async fn run_chunked<'c, T, C, R, F, Fut>(
    mut action: F,
    items: Vec<T>,
    chunk_size: usize,
    context: &'c C,
    delay: Duration,
) -> Result<Vec<R>, Failure>
where
    C: ?Sized,
    F: FnMut(Vec<T>, &'c C) -> Fut,
    Fut: Future<Output = Result<R, Failure>>,
{
    if chunk_size == 0 {
        return Err(Failure::validation("chunk size must be at least 1"));
    }

    let total = items.len().div_ceil(chunk_size);
    let mut results = Vec::with_capacity(total);
    let mut remaining = items.into_iter().peekable();
    let mut iteration = 0;

    while remaining.peek().is_some() {
        let chunk: Vec<T> = remaining.by_ref().take(chunk_size).collect();
        debug!(iteration, total, size = chunk.len(), "performing action on chunk");

        match action(chunk, context).await {
            Ok(result) => results.push(result),
            Err(err) => {
                warn!(iteration, total, error = %err, "chunk action failed, aborting batch");
                return Err(Failure::Batch {
                    iteration,
                    source: Box::new(err),
                });
            }
        }
        iteration += 1;

        if remaining.peek().is_some() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    debug!(iterations = iteration, "chunked batch complete");
    Ok(results)
}

/// Concatenate the array bodies of per-chunk envelopes, preserving order.
///
/// Returns the combined items and the status code of the last envelope.
pub fn concat_bodies(envelopes: Vec<Envelope>) -> (Vec<Value>, Option<u16>) {
    let mut code = None;
    let mut items = Vec::new();
    for envelope in envelopes {
        code = envelope.code.or(code);
        match envelope.body {
            Some(Value::Array(values)) => items.extend(values),
            Some(other) => items.push(other),
            None => {}
        }
    }
    (items, code)
}
