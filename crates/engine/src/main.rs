//! Sitesmith command line.
//!
//! Thin wrapper over the engine library: initialize the store, or
//! rebuild every published artifact from it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sitesmith_engine::{Config, SiteEngine};

#[derive(Parser)]
#[command(name = "sitesmith", about = "Config-driven static site engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database and run migrations.
    Init,
    /// Regenerate every artifact from the current config.
    Rebuild,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Init => {
            SiteEngine::new(&config)
                .await
                .context("failed to initialize engine")?;
            info!(database = %config.database_url, "store initialized");
        }
        Command::Rebuild => {
            let engine = SiteEngine::new(&config)
                .await
                .context("failed to initialize engine")?;
            engine.rebuild_all().await.context("rebuild failed")?;
            info!(output = %config.output_dir.display(), "site rebuilt");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
