pub mod blockchain;
pub mod config;
pub mod contract_writer;
pub mod contracts;
pub mod database;
pub mod error;
pub mod executor;
pub mod jobs;
pub mod outcome;
pub mod report;
pub mod retry;
pub mod timeout;
pub mod transaction_monitor;

pub use blockchain::{BlockchainClient, ChainRpc, ContractCall, TransactionReceipt, TransactionStatus};
pub use config::ChainConfig;
pub use contract_writer::{ContractWriter, WriteError};
pub use error::{is_connection_failure, ConfigurationError};
pub use executor::{run_with_mode, split_by_status, RunMode};
pub use jobs::{HarvestJob, UnwrapJob};
pub use outcome::{track, TimedOutcome};
pub use retry::{execute_with_retry, with_retry, RetryConfig};
pub use timeout::{with_timeout, TimeoutError};
pub use transaction_monitor::{ConfirmationConfig, ConfirmationError, TransactionMonitor};
