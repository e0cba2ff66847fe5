//! badgekey - visitor badge kiosk
//!
//! Runs the scanner station against scripted frames, renders single visitor
//! cards, and lists the visitor table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod config;

use config::AppConfig;

/// badgekey - visitor badge kiosk
#[derive(Parser, Debug)]
#[command(name = "badgekey")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the kiosk configuration file
    #[arg(short, long, default_value = "badgekey.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scanner station against scripted QR frames
    Simulate(commands::simulate::SimulateArgs),

    /// Render one visitor card to a PNG file
    Card(commands::card::CardArgs),

    /// List the visitor table
    #[command(alias = "ls")]
    Visitors {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Simulate(args) => commands::simulate::run(&config, args).await,
        Commands::Card(args) => commands::card::run(&config, args).await,
        Commands::Visitors { json } => commands::visitors::run(&config, json),
    }
}

/// Load `path` if it exists, otherwise fall back to the built-in defaults.
fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "No configuration file, using defaults");
        return Ok(AppConfig::default());
    }

    AppConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}
