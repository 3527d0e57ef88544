use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

use notion_habitica_sync::config::Config;
use notion_habitica_sync::logger;
use notion_habitica_sync::scheduler::{self, CronSchedule};
use notion_habitica_sync::sync::{SyncService, SyncStatus};

/// Mirror a Notion task database onto a Habitica to-do list.
#[derive(Debug, Parser)]
#[command(name = "notion-habitica-sync", version, about)]
struct Cli {
    /// Configuration file (defaults to ./notion-habitica-sync.toml, then the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single sync cycle and exit
    #[arg(long)]
    once: bool,

    /// Also mark Notion tasks Done when their Habitica to-do is completed
    #[arg(long)]
    bidirectional: bool,

    /// Write a default configuration file to PATH and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.generate_config {
        return Config::generate_default_config(path);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.bidirectional {
        config.sync.bidirectional = true;
    }

    logger::init(&config.logging)?;

    let credentials = config.resolve_credentials()?;
    let schedule = CronSchedule::parse(&config.sync.schedule)?;
    let service = SyncService::from_config(&config, &credentials)?;

    if cli.once {
        return match service.sync().await? {
            SyncStatus::Success(stats) => {
                info!("✅ Single sync finished: {:?}", stats.execution);
                Ok(())
            }
            status => {
                error!("❌ Single sync did not complete: {status:?}");
                anyhow::bail!("sync did not complete")
            }
        };
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("❌ Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    scheduler::run(service, schedule, config.sync.run_on_startup, shutdown).await
}
