use anyhow::Result;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5), // Default values - overridden by TOML config in production
            max_delay: Duration::from_secs(300), // Default values - overridden by TOML config in production
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }
}

/// Re-invoke a failing operation up to `retry_count` additional times.
///
/// Attempts are counted from zero, so the operation runs at most
/// `retry_count + 1` times. `delay` and `should_retry` see the attempt
/// index and the error that ended it; the budget is checked before the
/// predicate, and either stopping condition propagates the last error
/// as-is. An in-flight attempt always runs to completion before the policy
/// is consulted again.
pub async fn with_retry<T, F, Fut, D, S>(
    operation: F,
    retry_count: u32,
    delay: D,
    should_retry: S,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
    D: Fn(u32, &anyhow::Error) -> Duration,
    S: Fn(u32, &anyhow::Error) -> bool,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= retry_count || !should_retry(attempt, &error) {
                    return Err(error);
                }
                let wait = delay(attempt, &error);
                if !wait.is_zero() {
                    sleep(wait).await;
                }
                attempt += 1;
            }
        }
    }
}

/// Capped exponential backoff for a zero-based attempt index.
fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let exponential_delay =
        config.base_delay.as_secs_f64() * config.backoff_multiplier.powi(attempt as i32);

    let delay_seconds = exponential_delay.min(config.max_delay.as_secs_f64());
    Duration::from_secs_f64(delay_seconds)
}

/// Config-driven retry with progress lines, used by jobs for coarse
/// operations such as connecting a client. Every failure is retried until
/// the configured attempt budget runs out.
pub async fn execute_with_retry<T, F, Fut>(
    operation: F,
    retry_config: &RetryConfig,
    operation_name: &str,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = retry_config.max_attempts.max(1);
    let attempt_number = AtomicU32::new(0);

    with_retry(
        || {
            let attempt = attempt_number.fetch_add(1, Ordering::SeqCst) + 1;
            println!("🔄 {} attempt {}/{}", operation_name, attempt, max_attempts);
            let run = operation();
            async move {
                match run.await {
                    Ok(value) => {
                        println!("✅ {} succeeded on attempt {}", operation_name, attempt);
                        Ok(value)
                    }
                    Err(error) => {
                        println!(
                            "❌ {} failed on attempt {}: {:#}",
                            operation_name, attempt, error
                        );
                        Err(error)
                    }
                }
            }
        },
        max_attempts - 1,
        |attempt, _| {
            let delay = calculate_delay(attempt, retry_config);
            println!("⏳ Waiting {:?} before retry...", delay);
            delay
        },
        |_, _| true,
    )
    .await
    .map_err(|error| error.context(format!("{operation_name} failed after {max_attempts} attempts")))
}
