use anyhow::Result;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// A guarded operation exceeded its bound.
///
/// Carries the configured bound and, when the caller observed one before
/// expiry, the last in-flight error.
#[derive(Debug)]
pub struct TimeoutError {
    pub bound: Duration,
    pub previous: Option<anyhow::Error>,
}

impl TimeoutError {
    pub fn new(bound: Duration) -> Self {
        Self {
            bound,
            previous: None,
        }
    }

    pub fn with_previous(bound: Duration, previous: anyhow::Error) -> Self {
        Self {
            bound,
            previous: Some(previous),
        }
    }
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.previous {
            Some(previous) => write!(
                f,
                "timed out after {:?} (last error: {previous:#})",
                self.bound
            ),
            None => write!(f, "timed out after {:?}", self.bound),
        }
    }
}

impl std::error::Error for TimeoutError {}

/// Race `operation` against `bound`.
///
/// Whichever settles first decides the result; the loser's eventual
/// settlement is discarded, never awaited. The operation is spawned as a
/// task, so expiry detaches it rather than aborting it: an in-flight RPC
/// call keeps running to completion in the background. That leak is
/// tolerated in preference to pretending the transport supports
/// cancellation.
pub async fn with_timeout<T, Fut>(operation: Fut, bound: Duration) -> Result<T>
where
    T: Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let handle = tokio::spawn(operation);
    match tokio::time::timeout(bound, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(anyhow::anyhow!("guarded operation panicked: {join_error}")),
        Err(_) => Err(TimeoutError::new(bound).into()),
    }
}
