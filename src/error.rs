use crate::timeout::TimeoutError;
use thiserror::Error;

/// Invalid policy input, rejected before any work begins.
#[derive(Debug, Error)]
#[error("invalid configuration: {0}")]
pub struct ConfigurationError(pub String);

/// Whether an RPC failure looks like a dropped connection or a poll
/// timeout, i.e. is worth retrying.
///
/// Alloy surfaces transport drops as opaque message strings at this
/// boundary, so the check is a case-insensitive text match plus a downcast
/// for this crate's own timeout failure. Swap the text match for a
/// structured error-code check here if the client ever exposes one.
pub fn is_connection_failure(error: &anyhow::Error) -> bool {
    if error.downcast_ref::<TimeoutError>().is_some() {
        return true;
    }
    let message = format!("{error:#}").to_lowercase();
    message.contains("connection terminated")
        || message.contains("connection reset")
        || message.contains("connection closed")
        || message.contains("broken pipe")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timeout_error_is_retryable() {
        let error = anyhow::Error::new(TimeoutError::new(Duration::from_secs(1)));
        assert!(is_connection_failure(&error));
    }

    #[test]
    fn test_dropped_connection_text_is_retryable_case_insensitive() {
        let error = anyhow::anyhow!("Connection Terminated unexpectedly");
        assert!(is_connection_failure(&error));

        let error = anyhow::anyhow!("io error: connection reset by peer");
        assert!(is_connection_failure(&error));
    }

    #[test]
    fn test_wrapped_cause_is_still_classified() {
        let error = anyhow::anyhow!("connection terminated").context("fetching receipt");
        assert!(is_connection_failure(&error));
    }

    #[test]
    fn test_chain_rejection_is_not_retryable() {
        let error = anyhow::anyhow!("nonce too low");
        assert!(!is_connection_failure(&error));

        let error = anyhow::anyhow!("execution reverted");
        assert!(!is_connection_failure(&error));
    }
}
