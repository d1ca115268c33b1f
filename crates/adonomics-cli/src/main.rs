mod ads;
mod db;
mod videos;

use std::sync::Arc;

use adonomics_core::AppConfig;
use adonomics_pipeline::{AdvertisementStore, AnalysisOrchestrator, PgStore};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{ads::AdsCommands, db::DbCommands, videos::VideosCommands};

#[derive(Debug, Parser)]
#[command(name = "adonomics-cli")]
#[command(about = "Adonomics operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect and analyze advertisements
    Ads {
        #[command(subcommand)]
        command: AdsCommands,
    },
    /// Query the video index directly
    Videos {
        #[command(subcommand)]
        command: VideosCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("adonomics-cli: run with --help to list commands");
        return Ok(());
    };

    let config = adonomics_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = adonomics_db::PoolConfig::from_app_config(&config);
    let pool = adonomics_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => db::run(&pool, command).await,
        Commands::Ads { command } => {
            let orchestrator = build_orchestrator(&config, pool)?;
            ads::run(&orchestrator, command).await
        }
        Commands::Videos { command } => {
            let orchestrator = build_orchestrator(&config, pool)?;
            videos::run(&orchestrator, command).await
        }
    }
}

fn build_orchestrator(
    config: &AppConfig,
    pool: sqlx::PgPool,
) -> anyhow::Result<AnalysisOrchestrator> {
    let store: Arc<dyn AdvertisementStore> = Arc::new(PgStore::new(pool));
    Ok(AnalysisOrchestrator::from_config(config, store)?)
}

#[cfg(test)]
mod tests;
