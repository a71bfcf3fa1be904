use crate::error::ConfigurationError;
use crate::executor::RunMode;
use crate::retry::RetryConfig;
use crate::transaction_monitor::ConfirmationConfig;
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub chain: ChainSettings,
    #[serde(default)]
    pub vaults: Vec<VaultSettings>,
    pub wnative: Option<WnativeSettings>,
    pub retry: RetrySettings,
    pub confirmation: ConfirmationSettings,
    pub harvest: HarvestSettings,
    pub database: Option<DatabaseSettings>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainSettings {
    pub name: String,
    pub chain_id: u64,
    pub rpc_url: String,
    pub private_key: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VaultSettings {
    pub name: String,
    pub strategy_address: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WnativeSettings {
    pub address: String,
    pub min_unwrap_wei: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_seconds: u64,
    pub max_delay_seconds: u64,
    pub backoff_multiplier: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmationSettings {
    pub attempt_timeout_seconds: u64,
    pub retry_count: u32,
    pub poll_delay_seconds: u64,
    pub receipt_poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarvestSettings {
    pub run: RunMode,
    pub call_fee_recipient: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub full_retention_days: u32,
    pub daily_retention_days: u32,
}

impl ChainConfig {
    pub fn load(path: &str) -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let content = fs::read_to_string(path)?;

        // Simple environment variable substitution
        let content = Self::substitute_env_vars(content)?;

        let config: ChainConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if let RunMode::ParallelBatched { batch_size } = self.harvest.run {
            if batch_size == 0 {
                return Err(ConfigurationError(
                    "harvest.run.batch_size must be greater than 0".to_string(),
                ));
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.confirmation.attempt_timeout_seconds == 0 {
            return Err(ConfigurationError(
                "confirmation.attempt_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    fn substitute_env_vars(content: String) -> Result<String> {
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")?;
        let mut result = content.clone();

        for cap in re.captures_iter(&content) {
            let var_name = &cap[1];
            if let Ok(value) = env::var(var_name) {
                let placeholder = cap[0].to_string();
                result = result.replace(&placeholder, &value);
            }
        }

        Ok(result)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.retry.max_attempts,
            Duration::from_secs(self.retry.base_delay_seconds),
            Duration::from_secs(self.retry.max_delay_seconds),
            self.retry.backoff_multiplier,
        )
    }

    pub fn confirmation_config(&self) -> ConfirmationConfig {
        ConfirmationConfig {
            attempt_timeout: Duration::from_secs(self.confirmation.attempt_timeout_seconds),
            retry_count: self.confirmation.retry_count,
            poll_delay: Duration::from_secs(self.confirmation.poll_delay_seconds),
        }
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_secs(self.confirmation.receipt_poll_interval_seconds)
    }
}
