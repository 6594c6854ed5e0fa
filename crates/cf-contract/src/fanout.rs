//! Concurrent read fan-out with aggregated failure reporting.

use std::future::Future;

use cf_core::error::{ForumError, Result};
use futures_util::future::join_all;

/// Drives every read to completion and keeps input order. A single failure is
/// returned as-is; several are reported together as `ForumError::Aggregate`.
pub(crate) async fn gather<T, F>(reads: impl IntoIterator<Item = F>) -> Result<Vec<T>>
where
    F: Future<Output = Result<T>>,
{
    let results = join_all(reads).await;

    let mut values = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(err) => failures.push(err),
        }
    }

    match failures.len() {
        0 => Ok(values),
        1 => Err(failures.remove(0)),
        _ => Err(ForumError::Aggregate(failures)),
    }
}
