use crate::blockchain::{TransactionReceipt, TransactionStatus};
use crate::outcome::TimedOutcome;
use serde_json::{json, Value};

/// Tag stored alongside each persisted report row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Harvest,
    Unwrap,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Harvest => "harvest",
            ReportType::Unwrap => "unwrap",
        }
    }
}

/// Serialize a timed outcome into the settled-record shape reports use.
pub fn outcome_report<T>(outcome: &TimedOutcome<T>, value_to_json: impl FnOnce(&T) -> Value) -> Value {
    let timing = json!({
        "started_at": outcome.timing.started_at.to_rfc3339(),
        "ended_at": outcome.timing.ended_at.to_rfc3339(),
        "duration_ms": outcome.timing.duration_ms,
    });

    match &outcome.outcome {
        Ok(value) => json!({
            "status": "fulfilled",
            "value": value_to_json(value),
            "timing": timing,
        }),
        Err(reason) => json!({
            "status": "rejected",
            "reason": format!("{reason:#}"),
            "timing": timing,
        }),
    }
}

pub fn receipt_summary(receipt: &TransactionReceipt) -> Value {
    json!({
        "tx_hash": format!("{:?}", receipt.hash),
        "block_number": receipt.block_number,
        "gas_used": receipt.gas_used.to_string(),
        "success": receipt.status == TransactionStatus::Success,
    })
}

pub fn vault_report(chain: &str, vault: &str, outcome: &TimedOutcome<TransactionReceipt>) -> Value {
    json!({
        "chain": chain,
        "vault": vault,
        "outcome": outcome_report(outcome, receipt_summary),
    })
}

pub fn unwrap_report(
    chain: &str,
    amount_wei: &str,
    outcome: &TimedOutcome<TransactionReceipt>,
) -> Value {
    json!({
        "chain": chain,
        "amount_wei": amount_wei,
        "outcome": outcome_report(outcome, receipt_summary),
    })
}
