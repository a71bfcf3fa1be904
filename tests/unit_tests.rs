use harvest_keeper::config::ChainConfig;
use harvest_keeper::executor::{run_with_mode, split_by_status, RunMode};
use harvest_keeper::outcome::track;
use harvest_keeper::retry::with_retry;
use anyhow::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

fn base_config_content() -> &'static str {
    r#"
[chain]
name = "soneium"
chain_id = 1946
rpc_url = "https://rpc.soneium.org"
private_key = "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"

[[vaults]]
name = "vault-a"
strategy_address = "0x1111111111111111111111111111111111111111"

[[vaults]]
name = "vault-b"
strategy_address = "0x2222222222222222222222222222222222222222"

[wnative]
address = "0x3333333333333333333333333333333333333333"
min_unwrap_wei = "1000000000000000000"

[retry]
max_attempts = 3
base_delay_seconds = 5
max_delay_seconds = 300
backoff_multiplier = 2.0

[confirmation]
attempt_timeout_seconds = 30
retry_count = 5
poll_delay_seconds = 3
receipt_poll_interval_seconds = 3

[harvest]
call_fee_recipient = "0x4444444444444444444444444444444444444444"
run = { type = "parallel-batched", batch_size = 2 }
"#
}

#[tokio::test]
async fn test_config_loading() -> Result<()> {
    let temp_file = std::env::temp_dir().join("harvest_keeper_test_config.toml");
    std::fs::write(&temp_file, base_config_content())?;

    let config = ChainConfig::load(temp_file.to_str().unwrap())?;

    assert_eq!(config.chain.name, "soneium");
    assert_eq!(config.chain.chain_id, 1946);
    assert_eq!(config.vaults.len(), 2);
    assert_eq!(config.vaults[0].name, "vault-a");
    assert_eq!(config.harvest.run, RunMode::ParallelBatched { batch_size: 2 });
    assert_eq!(config.confirmation.retry_count, 5);
    assert!(config.database.is_none());

    std::fs::remove_file(&temp_file)?;

    println!("✅ Config loading test passed");
    Ok(())
}

#[tokio::test]
async fn test_environment_variable_substitution() -> Result<()> {
    std::env::set_var("TEST_KEEPER_RPC_URL", "https://test.example.com");

    let content = base_config_content().replace(
        "https://rpc.soneium.org",
        "${TEST_KEEPER_RPC_URL}",
    );
    let temp_file = std::env::temp_dir().join("harvest_keeper_test_env_config.toml");
    std::fs::write(&temp_file, content)?;

    let config = ChainConfig::load(temp_file.to_str().unwrap())?;

    assert_eq!(config.chain.rpc_url, "https://test.example.com");

    std::fs::remove_file(&temp_file)?;
    std::env::remove_var("TEST_KEEPER_RPC_URL");

    println!("✅ Environment variable substitution test passed");
    Ok(())
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected_at_load() -> Result<()> {
    let content = base_config_content().replace("batch_size = 2", "batch_size = 0");
    let temp_file = std::env::temp_dir().join("harvest_keeper_test_bad_batch_config.toml");
    std::fs::write(&temp_file, content)?;

    let result = ChainConfig::load(temp_file.to_str().unwrap());

    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("batch_size must be greater than 0"));

    std::fs::remove_file(&temp_file)?;

    println!("✅ Zero batch size rejection test passed");
    Ok(())
}

#[tokio::test]
async fn test_retry_budget_counts_attempts() -> Result<()> {
    let call_count = AtomicU32::new(0);

    let result: Result<&str> = with_retry(
        || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async move { Err(anyhow::anyhow!("always fails")) }
        },
        2,
        |_, _| Duration::from_millis(1),
        |_, _| true,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(call_count.load(Ordering::SeqCst), 3);

    println!("✅ Retry budget test passed");
    Ok(())
}

#[tokio::test]
async fn test_timed_outcome_properties() -> Result<()> {
    let success = track(|| async { Ok::<_, anyhow::Error>("value") }).await;
    let failure = track(|| async { Err::<&str, _>(anyhow::anyhow!("reason")) }).await;

    assert!(success.is_success());
    assert!(!failure.is_success());
    assert!(success.timing.ended_at >= success.timing.started_at);
    assert!(failure.timing.ended_at >= failure.timing.started_at);

    println!("✅ Timed outcome properties test passed");
    Ok(())
}

#[tokio::test]
async fn test_run_with_mode_and_split() -> Result<()> {
    let results = run_with_mode(RunMode::Sequential, vec!["a", "b"], |item| async move {
        if item == "a" {
            Err(anyhow::anyhow!("a failed"))
        } else {
            Ok(item)
        }
    })
    .await
    .unwrap();

    assert!(results[0].is_err());
    assert_eq!(*results[1].as_ref().unwrap(), "b");

    let (fulfilled, rejected) = split_by_status(results);
    assert_eq!(fulfilled, vec!["b"]);
    assert_eq!(rejected.len(), 1);

    println!("✅ Run mode and split test passed");
    Ok(())
}
