use crate::blockchain::{ChainRpc, ContractCall, TransactionReceipt, TransactionStatus};
use crate::transaction_monitor::{ConfirmationConfig, ConfirmationError, TransactionMonitor};
use alloy::primitives::B256;
use std::sync::Arc;
use thiserror::Error;

/// Terminal failures of a write-and-confirm call, tagged by how far the
/// transaction got.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The transaction was never accepted by the RPC endpoint.
    #[error("submission failed: {reason:#}")]
    SubmissionFailed { reason: anyhow::Error },
    /// Submitted, but no receipt within the confirmation budget. The
    /// transaction may still land later.
    #[error("transaction {tx_hash} not confirmed in time ({polls} polls): {last_error:#}")]
    ConfirmationTimedOut {
        tx_hash: B256,
        polls: u32,
        last_error: anyhow::Error,
    },
    /// Submitted and definitively failed: the chain rejected it or the
    /// transaction was mined but reverted.
    #[error("transaction {tx_hash} failed: {reason:#}")]
    TransactionFailed {
        tx_hash: B256,
        reason: anyhow::Error,
    },
}

pub struct ContractWriter {
    client: Arc<dyn ChainRpc>,
    monitor: TransactionMonitor,
}

impl ContractWriter {
    pub fn new(client: Arc<dyn ChainRpc>, confirmation: ConfirmationConfig) -> Self {
        let monitor = TransactionMonitor::new(client.clone(), confirmation);
        Self { client, monitor }
    }

    /// Submit a contract write and see it through to a mined, successful
    /// receipt.
    ///
    /// Submission errors are never retried; they are reported as-is. After
    /// submission the confirmation orchestrator takes over, so the caller
    /// always gets either a confirmed receipt or exactly one tagged
    /// terminal failure.
    pub async fn write_and_confirm(
        &self,
        call: ContractCall,
    ) -> Result<TransactionReceipt, WriteError> {
        let tx_hash = self
            .client
            .submit_contract_write(call)
            .await
            .map_err(|reason| WriteError::SubmissionFailed { reason })?;
        println!("📤 Transaction submitted: {:?}", tx_hash);

        let receipt = self.monitor.confirm(tx_hash).await.map_err(|error| match error {
            ConfirmationError::TimedOut {
                tx_hash,
                attempts,
                last_error,
            } => WriteError::ConfirmationTimedOut {
                tx_hash,
                polls: attempts,
                last_error,
            },
            ConfirmationError::Fatal { tx_hash, reason } => {
                WriteError::TransactionFailed { tx_hash, reason }
            }
        })?;

        if receipt.status == TransactionStatus::Failed {
            return Err(WriteError::TransactionFailed {
                tx_hash,
                reason: anyhow::anyhow!("reverted in block {}", receipt.block_number),
            });
        }

        Ok(receipt)
    }
}
