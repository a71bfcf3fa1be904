use crate::blockchain::{BlockchainClient, ChainRpc};
use crate::config::ChainConfig;
use crate::contract_writer::ContractWriter;
use crate::contracts::wnative::WrappedNativeContract;
use crate::database::ReportSink;
use crate::error::ConfigurationError;
use crate::outcome::track;
use crate::report::{unwrap_report, ReportType};
use crate::retry::execute_with_retry;
use alloy::primitives::U256;
use anyhow::Result;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

pub struct UnwrapJob {
    config: ChainConfig,
    sink: Option<Arc<dyn ReportSink>>,
    dry_run: bool,
}

impl UnwrapJob {
    pub fn new(config: ChainConfig, sink: Option<Arc<dyn ReportSink>>, dry_run: bool) -> Self {
        Self {
            config,
            sink,
            dry_run,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        println!("💧 Unwrap Job Starting...");

        let wnative_config = self.config.wnative.as_ref().ok_or_else(|| {
            ConfigurationError("wnative section is required for the unwrap job".to_string())
        })?;

        let retry_config = self.config.retry_config();
        let client = execute_with_retry(
            || {
                let rpc_url = self.config.chain.rpc_url.clone();
                let chain_id = self.config.chain.chain_id;
                let private_key = self.config.chain.private_key.clone();
                let poll_interval = self.config.receipt_poll_interval();
                async move {
                    BlockchainClient::new(&rpc_url, chain_id, &private_key, poll_interval).await
                }
            },
            &retry_config,
            "Blockchain connection",
        )
        .await?;

        let client = Arc::new(client);
        let wnative = WrappedNativeContract::new(
            BlockchainClient::parse_address(&wnative_config.address)?,
            client.provider(),
        );

        let balance = wnative.balance_of(client.address()).await?;
        let min_unwrap = U256::from_str(&wnative_config.min_unwrap_wei)?;
        println!("💰 Wrapped native balance: {}", balance);

        if balance < min_unwrap {
            println!(
                "⏳ Balance below threshold ({} < {}), skipping unwrap",
                balance, min_unwrap
            );
            return Ok(());
        }

        if self.dry_run {
            println!("✅ DRY RUN: Would unwrap {}", balance);
            return Ok(());
        }

        let writer = ContractWriter::new(
            client.clone() as Arc<dyn ChainRpc>,
            self.config.confirmation_config(),
        );
        let call = wnative.withdraw_call(balance);
        let outcome = track(|| async {
            writer
                .write_and_confirm(call)
                .await
                .map_err(anyhow::Error::from)
        })
        .await;

        if let Some(sink) = &self.sink {
            let report = unwrap_report(
                &self.config.chain.name,
                &balance.to_string(),
                &outcome,
            );
            if let Err(error) = sink
                .publish(ReportType::Unwrap, &self.config.chain.name, report)
                .await
            {
                warn!(error = %format!("{error:#}"), "report publish failed");
            }
        }

        let receipt = outcome.into_result()?;
        println!(
            "🎉 Unwrapped {} in block {} (gas: {})",
            balance, receipt.block_number, receipt.gas_used
        );
        Ok(())
    }
}
