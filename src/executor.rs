use crate::error::ConfigurationError;
use anyhow::Result;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// How a collection of independent operations is driven.
///
/// Config files select a mode with a `type` tag, e.g.
/// `{ type = "parallel-batched", batch_size = 5 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RunMode {
    Parallel,
    Sequential,
    ParallelBatched { batch_size: usize },
}

/// Run every item through `process` under the given mode.
///
/// The output has one settled outcome per item, in input order, for every
/// mode; a failing item never aborts the rest. The only up-front failure is
/// a zero batch size, rejected before any item is processed.
pub async fn run_with_mode<T, R, F, Fut>(
    mode: RunMode,
    items: Vec<T>,
    process: F,
) -> Result<Vec<Result<R>>, ConfigurationError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    match mode {
        RunMode::Parallel => Ok(run_parallel(items, process).await),
        RunMode::Sequential => Ok(run_sequentially(items, process).await),
        RunMode::ParallelBatched { batch_size } => {
            run_parallel_batches(items, batch_size, process).await
        }
    }
}

/// One item at a time, in input order; each outcome recorded independently.
pub async fn run_sequentially<T, R, F, Fut>(items: Vec<T>, process: F) -> Vec<Result<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        results.push(process(item).await);
    }
    results
}

/// All items concurrently; completion order is unspecified but the result
/// order matches the input.
pub async fn run_parallel<T, R, F, Fut>(items: Vec<T>, process: F) -> Vec<Result<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    join_all(items.into_iter().map(process)).await
}

/// Contiguous batches of `batch_size`, each batch fully settled before the
/// next one starts. The last batch may be smaller.
pub async fn run_parallel_batches<T, R, F, Fut>(
    items: Vec<T>,
    batch_size: usize,
    process: F,
) -> Result<Vec<Result<R>>, ConfigurationError>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    if batch_size == 0 {
        return Err(ConfigurationError(
            "batch size must be greater than 0".to_string(),
        ));
    }

    let mut results = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter();
    loop {
        let batch: Vec<T> = remaining.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        results.extend(run_parallel(batch, &process).await);
    }
    Ok(results)
}

/// Partition settled outcomes into successful values and failure reasons.
///
/// Positional correspondence with the input is lost; callers that need the
/// per-item mapping must walk the settled sequence instead.
pub fn split_by_status<R>(results: Vec<Result<R>>) -> (Vec<R>, Vec<anyhow::Error>) {
    let mut fulfilled = Vec::new();
    let mut rejected = Vec::new();
    for result in results {
        match result {
            Ok(value) => fulfilled.push(value),
            Err(reason) => rejected.push(reason),
        }
    }
    (fulfilled, rejected)
}
