use crate::blockchain::{BlockchainClient, ChainRpc};
use crate::config::{ChainConfig, VaultSettings};
use crate::contract_writer::ContractWriter;
use crate::contracts::strategy::StrategyContract;
use crate::database::ReportSink;
use crate::executor::{run_with_mode, split_by_status};
use crate::outcome::track;
use crate::report::{vault_report, ReportType};
use crate::retry::execute_with_retry;
use alloy::network::Ethereum;
use alloy::primitives::Address;
use alloy::providers::Provider;
use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

pub struct HarvestJob {
    config: ChainConfig,
    sink: Option<Arc<dyn ReportSink>>,
    dry_run: bool,
}

impl HarvestJob {
    pub fn new(config: ChainConfig, sink: Option<Arc<dyn ReportSink>>, dry_run: bool) -> Self {
        Self {
            config,
            sink,
            dry_run,
        }
    }

    pub async fn execute(&self) -> Result<()> {
        println!("🌾 Harvest Job Starting...");

        if self.config.vaults.is_empty() {
            println!("⏳ No vaults configured, nothing to harvest");
            return Ok(());
        }

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
        let provider = client.provider();
        let writer = Arc::new(ContractWriter::new(
            client.clone() as Arc<dyn ChainRpc>,
            self.config.confirmation_config(),
        ));
        let call_fee_recipient =
            BlockchainClient::parse_address(&self.config.harvest.call_fee_recipient)?;

        let vault_count = self.config.vaults.len();
        println!(
            "🌾 Harvesting {} vaults in {:?} mode",
            vault_count, self.config.harvest.run
        );

        let results = run_with_mode(
            self.config.harvest.run,
            self.config.vaults.clone(),
            |vault| {
                let provider = provider.clone();
                let writer = writer.clone();
                async move {
                    self.harvest_vault(vault, provider, writer, call_fee_recipient)
                        .await
                }
            },
        )
        .await?;

        let (harvested, failures) = split_by_status(results);
        println!(
            "✅ Harvest finished: {} succeeded, {} failed",
            harvested.len(),
            failures.len()
        );
        for failure in &failures {
            println!("❌ {:#}", failure);
        }

        if !failures.is_empty() {
            return Err(anyhow::anyhow!(
                "{} of {} harvests failed",
                failures.len(),
                vault_count
            ));
        }
        Ok(())
    }

    async fn harvest_vault(
        &self,
        vault: VaultSettings,
        provider: Arc<dyn Provider<Ethereum>>,
        writer: Arc<ContractWriter>,
        call_fee_recipient: Address,
    ) -> Result<String> {
        let strategy = StrategyContract::new(
            BlockchainClient::parse_address(&vault.strategy_address)?,
            provider,
        );

        if strategy.paused().await? {
            println!("⏸️  {} strategy is paused, skipping", vault.name);
            return Ok(vault.name);
        }

        let last_harvest = strategy.last_harvest().await?;
        println!("🌾 Harvesting {} (last harvest at {})", vault.name, last_harvest);

        if self.dry_run {
            println!("✅ DRY RUN: Would harvest {}", vault.name);
            return Ok(vault.name);
        }

        let call = strategy.harvest_call(call_fee_recipient);
        let outcome = track(|| async {
            writer
                .write_and_confirm(call)
                .await
                .map_err(anyhow::Error::from)
        })
        .await;

        self.publish(
            ReportType::Harvest,
            vault_report(&self.config.chain.name, &vault.name, &outcome),
        )
        .await;

        let receipt = outcome.into_result()?;
        println!(
            "🎉 {} harvested in block {} (gas: {})",
            vault.name, receipt.block_number, receipt.gas_used
        );
        Ok(vault.name)
    }

    async fn publish(&self, report_type: ReportType, report: serde_json::Value) {
        if let Some(sink) = &self.sink {
            if let Err(error) = sink
                .publish(report_type, &self.config.chain.name, report)
                .await
            {
                warn!(error = %format!("{error:#}"), "report publish failed");
            }
        }
    }
}
