use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Instant;

/// Wall-clock bounds and duration of one tracked operation.
#[derive(Debug, Clone)]
pub struct Timing {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// A settled operation result with its timing attached.
///
/// Exactly one of value/error is populated (encoded by `Result`). Instances
/// are created once per tracked invocation and not mutated afterwards.
#[derive(Debug)]
pub struct TimedOutcome<T> {
    pub outcome: Result<T>,
    pub timing: Timing,
}

impl<T> TimedOutcome<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Project a value out of a successful outcome, `None` on failure.
    pub fn get<R>(&self, getter: impl FnOnce(&T) -> R) -> Option<R> {
        self.outcome.as_ref().ok().map(getter)
    }

    pub fn into_result(self) -> Result<T> {
        self.outcome
    }
}

/// Run the producer exactly once and record its settled result with timing.
///
/// Never fails itself: the producer's error is captured into the outcome
/// instead of propagating.
pub async fn track<T, F, Fut>(producer: F) -> TimedOutcome<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let started_at = Utc::now();
    let clock = Instant::now();
    let outcome = producer().await;
    TimedOutcome {
        outcome,
        timing: Timing {
            started_at,
            ended_at: Utc::now(),
            duration_ms: clock.elapsed().as_millis() as u64,
        },
    }
}
