//! Integration Tests
//!
//! Confirmation and write orchestration against a scripted mock chain
//! client: transient failures retry, fatal failures stop immediately, and
//! an exhausted budget is reported as a timeout rather than a failure.

use alloy::primitives::{Address, Bytes, B256, U256};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use harvest_keeper::blockchain::{ChainRpc, ContractCall, TransactionReceipt, TransactionStatus};
use harvest_keeper::contract_writer::{ContractWriter, WriteError};
use harvest_keeper::timeout::TimeoutError;
use harvest_keeper::transaction_monitor::{
    ConfirmationConfig, ConfirmationError, TransactionMonitor,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum PollStep {
    /// Dropped-connection style transport failure.
    Transient,
    /// Definitive chain-side rejection.
    Fatal,
    /// Never resolves within the per-attempt bound.
    Hang,
    /// Receipt is available.
    Mined(TransactionStatus),
}

struct MockChainRpc {
    handle: B256,
    submit_error: Option<String>,
    script: Mutex<VecDeque<PollStep>>,
    submissions: AtomicU32,
    polls: AtomicU32,
}

impl MockChainRpc {
    fn new(handle: B256, script: Vec<PollStep>) -> Arc<Self> {
        Arc::new(Self {
            handle,
            submit_error: None,
            script: Mutex::new(script.into()),
            submissions: AtomicU32::new(0),
            polls: AtomicU32::new(0),
        })
    }

    fn failing_submission(message: &str) -> Arc<Self> {
        Arc::new(Self {
            handle: B256::ZERO,
            submit_error: Some(message.to_string()),
            script: Mutex::new(VecDeque::new()),
            submissions: AtomicU32::new(0),
            polls: AtomicU32::new(0),
        })
    }

    fn polls(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn submit_contract_write(&self, _call: ContractCall) -> Result<B256> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        match &self.submit_error {
            Some(message) => Err(anyhow!("{}", message)),
            None => Ok(self.handle),
        }
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(PollStep::Transient) => Err(anyhow!("connection terminated unexpectedly")),
            Some(PollStep::Fatal) => Err(anyhow!("nonce too low")),
            Some(PollStep::Hang) | None => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(anyhow!("scripted hang should have been cut off"))
            }
            Some(PollStep::Mined(status)) => Ok(TransactionReceipt {
                hash: tx_hash,
                block_number: 1234,
                gas_used: U256::from(21000u64),
                status,
            }),
        }
    }
}

fn fast_confirmation(retry_count: u32) -> ConfirmationConfig {
    ConfirmationConfig {
        attempt_timeout: Duration::from_millis(100),
        retry_count,
        poll_delay: Duration::from_millis(5),
    }
}

fn harvest_call() -> ContractCall {
    ContractCall {
        to: Address::ZERO,
        data: Bytes::new(),
        value: U256::ZERO,
    }
}

fn tx_handle() -> B256 {
    B256::from(U256::from(0xabc))
}

#[tokio::test]
async fn test_confirmation_retries_transient_failures() -> Result<()> {
    let client = MockChainRpc::new(
        tx_handle(),
        vec![
            PollStep::Transient,
            PollStep::Transient,
            PollStep::Mined(TransactionStatus::Success),
        ],
    );
    let monitor = TransactionMonitor::new(client.clone(), fast_confirmation(5));

    let receipt = monitor.confirm(tx_handle()).await.unwrap();

    assert_eq!(receipt.status, TransactionStatus::Success);
    assert_eq!(receipt.block_number, 1234);
    assert_eq!(client.polls(), 3);

    println!("✅ Transient failure retry test passed");
    Ok(())
}

#[tokio::test]
async fn test_confirmation_fatal_error_stops_polling() -> Result<()> {
    let client = MockChainRpc::new(
        tx_handle(),
        vec![
            PollStep::Fatal,
            PollStep::Mined(TransactionStatus::Success),
        ],
    );
    let monitor = TransactionMonitor::new(client.clone(), fast_confirmation(5));

    let error = monitor.confirm(tx_handle()).await.unwrap_err();

    match error {
        ConfirmationError::Fatal { reason, .. } => {
            assert!(reason.to_string().contains("nonce too low"));
        }
        other => panic!("expected Fatal, got {other:?}"),
    }
    assert_eq!(client.polls(), 1);

    println!("✅ Fatal error short-circuit test passed");
    Ok(())
}

#[tokio::test]
async fn test_confirmation_budget_exhaustion_yields_timed_out() -> Result<()> {
    let client = MockChainRpc::new(
        tx_handle(),
        vec![PollStep::Hang, PollStep::Hang, PollStep::Hang],
    );
    let monitor = TransactionMonitor::new(client.clone(), fast_confirmation(2));

    let error = monitor.confirm(tx_handle()).await.unwrap_err();

    match error {
        ConfirmationError::TimedOut { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected TimedOut, got {other:?}"),
    }
    assert_eq!(client.polls(), 3);

    println!("✅ Budget exhaustion test passed");
    Ok(())
}

#[tokio::test]
async fn test_timed_out_carries_last_transport_error() -> Result<()> {
    let client = MockChainRpc::new(tx_handle(), vec![PollStep::Transient, PollStep::Hang]);
    let monitor = TransactionMonitor::new(client.clone(), fast_confirmation(1));

    let error = monitor.confirm(tx_handle()).await.unwrap_err();

    match error {
        ConfirmationError::TimedOut { last_error, .. } => {
            let timeout = last_error
                .downcast_ref::<TimeoutError>()
                .expect("final failure should be the poll timeout");
            let previous = timeout.previous.as_ref().expect("previous error attached");
            assert!(previous.to_string().contains("connection terminated"));
        }
        other => panic!("expected TimedOut, got {other:?}"),
    }

    println!("✅ Timeout previous-error test passed");
    Ok(())
}

#[tokio::test]
async fn test_write_and_confirm_end_to_end() -> Result<()> {
    let client = MockChainRpc::new(
        tx_handle(),
        vec![
            PollStep::Transient,
            PollStep::Mined(TransactionStatus::Success),
        ],
    );
    let writer = ContractWriter::new(
        client.clone() as Arc<dyn ChainRpc>,
        fast_confirmation(5),
    );

    let receipt = writer.write_and_confirm(harvest_call()).await.unwrap();

    assert_eq!(receipt.hash, tx_handle());
    assert_eq!(receipt.status, TransactionStatus::Success);
    assert_eq!(client.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(client.polls(), 2);

    println!("✅ End-to-end write test passed");
    Ok(())
}

#[tokio::test]
async fn test_submission_failure_is_never_retried() -> Result<()> {
    let client = MockChainRpc::failing_submission("insufficient funds for gas");
    let writer = ContractWriter::new(
        client.clone() as Arc<dyn ChainRpc>,
        fast_confirmation(5),
    );

    let error = writer.write_and_confirm(harvest_call()).await.unwrap_err();

    match error {
        WriteError::SubmissionFailed { reason } => {
            assert!(reason.to_string().contains("insufficient funds"));
        }
        other => panic!("expected SubmissionFailed, got {other:?}"),
    }
    assert_eq!(client.submissions.load(Ordering::SeqCst), 1);
    assert_eq!(client.polls(), 0);

    println!("✅ Submission failure test passed");
    Ok(())
}

#[tokio::test]
async fn test_reverted_transaction_is_definitively_failed() -> Result<()> {
    let client = MockChainRpc::new(
        tx_handle(),
        vec![PollStep::Mined(TransactionStatus::Failed)],
    );
    let writer = ContractWriter::new(
        client.clone() as Arc<dyn ChainRpc>,
        fast_confirmation(5),
    );

    let error = writer.write_and_confirm(harvest_call()).await.unwrap_err();

    match error {
        WriteError::TransactionFailed { tx_hash, reason } => {
            assert_eq!(tx_hash, tx_handle());
            assert!(reason.to_string().contains("reverted in block 1234"));
        }
        other => panic!("expected TransactionFailed, got {other:?}"),
    }

    println!("✅ Reverted transaction test passed");
    Ok(())
}

#[tokio::test]
async fn test_confirmation_timeout_is_tagged_for_write_callers() -> Result<()> {
    let client = MockChainRpc::new(tx_handle(), vec![PollStep::Hang, PollStep::Hang]);
    let writer = ContractWriter::new(
        client.clone() as Arc<dyn ChainRpc>,
        fast_confirmation(1),
    );

    let error = writer.write_and_confirm(harvest_call()).await.unwrap_err();

    match error {
        WriteError::ConfirmationTimedOut { tx_hash, polls, .. } => {
            assert_eq!(tx_hash, tx_handle());
            assert_eq!(polls, 2);
        }
        other => panic!("expected ConfirmationTimedOut, got {other:?}"),
    }

    println!("✅ Write timeout tagging test passed");
    Ok(())
}
