use crate::blockchain::{ChainRpc, TransactionReceipt};
use crate::error::is_connection_failure;
use crate::retry::with_retry;
use crate::timeout::{with_timeout, TimeoutError};
use alloy::primitives::B256;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Bounds for one confirmation: per-poll timeout, number of extra polls
/// after the first, and the pause between polls.
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub attempt_timeout: Duration,
    pub retry_count: u32,
    pub poll_delay: Duration,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            attempt_timeout: Duration::from_secs(30),
            retry_count: 5,
            poll_delay: Duration::from_secs(3),
        }
    }
}

/// Terminal confirmation failures. Mutually exclusive with a confirmed
/// receipt and with each other; no polling continues after either.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// Every poll failed with a retryable connection/timeout error and the
    /// budget ran out. The transaction may still land later.
    #[error("transaction {tx_hash} unconfirmed after {attempts} polls: {last_error:#}")]
    TimedOut {
        tx_hash: B256,
        attempts: u32,
        last_error: anyhow::Error,
    },
    /// The chain client reported a definitive, non-retryable failure.
    #[error("transaction {tx_hash} confirmation failed: {reason:#}")]
    Fatal {
        tx_hash: B256,
        reason: anyhow::Error,
    },
}

pub struct TransactionMonitor {
    client: Arc<dyn ChainRpc>,
    config: ConfirmationConfig,
}

impl TransactionMonitor {
    pub fn new(client: Arc<dyn ChainRpc>, config: ConfirmationConfig) -> Self {
        Self { client, config }
    }

    /// Poll for the receipt until the transaction is mined or the budget is
    /// spent.
    ///
    /// Each poll is raced against `attempt_timeout`. Connection-class
    /// failures and poll timeouts are retried up to `retry_count` times;
    /// any other failure is final on first occurrence.
    pub async fn confirm(&self, tx_hash: B256) -> Result<TransactionReceipt, ConfirmationError> {
        println!("🔍 Monitoring transaction: {:?}", tx_hash);

        let polls = AtomicU32::new(0);
        let last_transport_error: Mutex<Option<String>> = Mutex::new(None);

        let result = with_retry(
            || {
                polls.fetch_add(1, Ordering::SeqCst);
                let client = self.client.clone();
                with_timeout(
                    async move { client.wait_for_receipt(tx_hash).await },
                    self.config.attempt_timeout,
                )
            },
            self.config.retry_count,
            |_, _| self.config.poll_delay,
            |_, error| {
                let retryable = is_connection_failure(error);
                if retryable && error.downcast_ref::<TimeoutError>().is_none() {
                    *last_transport_error.lock().unwrap() = Some(format!("{error:#}"));
                }
                retryable
            },
        )
        .await;

        let attempts = polls.load(Ordering::SeqCst);
        match result {
            Ok(receipt) => {
                println!(
                    "✅ Transaction confirmed: {:?} (block {}, status {:?})",
                    tx_hash, receipt.block_number, receipt.status
                );
                Ok(receipt)
            }
            Err(error) if is_connection_failure(&error) => {
                println!(
                    "⏰ Gave up waiting for {:?} after {} polls",
                    tx_hash, attempts
                );
                let last_error = attach_previous(error, last_transport_error);
                Err(ConfirmationError::TimedOut {
                    tx_hash,
                    attempts,
                    last_error,
                })
            }
            Err(reason) => {
                println!("❌ Transaction {:?} failed: {:#}", tx_hash, reason);
                Err(ConfirmationError::Fatal { tx_hash, reason })
            }
        }
    }
}

/// When the final poll expired without its own underlying error, carry the
/// last transport failure seen by an earlier poll into the timeout.
fn attach_previous(
    error: anyhow::Error,
    last_transport_error: Mutex<Option<String>>,
) -> anyhow::Error {
    let previous = last_transport_error.into_inner().unwrap_or(None);
    match error.downcast::<TimeoutError>() {
        Ok(timeout) => match (timeout.previous.is_none(), previous) {
            (true, Some(message)) => anyhow::Error::new(TimeoutError::with_previous(
                timeout.bound,
                anyhow::anyhow!(message),
            )),
            _ => anyhow::Error::new(timeout),
        },
        Err(original) => original,
    }
}
