use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use harvest_keeper::config::ChainConfig;
use harvest_keeper::database::{Database, ReportSink};
use harvest_keeper::jobs::{HarvestJob, UnwrapJob};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "harvest-keeper",
    about = "Keeper service running resilient on-chain harvest and unwrap jobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest all configured vaults
    Harvest {
        #[arg(long)]
        config: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Unwrap wrapped-native balance above the configured threshold
    Unwrap {
        #[arg(long)]
        config: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete persisted reports past their retention windows
    ApplyRetention {
        #[arg(long)]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting harvest-keeper");

    let cli = Cli::parse();
    match cli.command {
        Command::Harvest { config, dry_run } => {
            let config = ChainConfig::load(&config)?;
            let sink = connect_sink(&config).await?;
            HarvestJob::new(config, sink, dry_run).execute().await
        }
        Command::Unwrap { config, dry_run } => {
            let config = ChainConfig::load(&config)?;
            let sink = connect_sink(&config).await?;
            UnwrapJob::new(config, sink, dry_run).execute().await
        }
        Command::ApplyRetention { config } => {
            let config = ChainConfig::load(&config)?;
            let settings = config.database.as_ref().ok_or_else(|| {
                anyhow::anyhow!("[database] section is required for apply-retention")
            })?;
            let database = Database::connect(&settings.url).await?;
            let deleted = database
                .apply_retention(settings.full_retention_days, settings.daily_retention_days)
                .await?;
            println!("🧹 Deleted {} expired reports", deleted);
            Ok(())
        }
    }
}

async fn connect_sink(config: &ChainConfig) -> Result<Option<Arc<dyn ReportSink>>> {
    match &config.database {
        Some(settings) => {
            let database = Database::connect(&settings.url).await?;
            Ok(Some(Arc::new(database) as Arc<dyn ReportSink>))
        }
        None => Ok(None),
    }
}
