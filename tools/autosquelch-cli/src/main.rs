//! Autosquelch CLI: drive the squelch plugin from a host event feed.
//!
//! Usage:
//!   autosquelch run [--events FILE]   Dispatch host events to the plugin
//!   autosquelch check                 Report the game window and click geometry
//!   autosquelch probe                 Sample the squelch bubble once, without clicking
//!   autosquelch config [--init]       Show or write the configuration

use std::path::PathBuf;

use autosquelch_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "autosquelch",
    about = "Automatically squelch your opponent at the start of each game",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the per-user config path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read host events and squelch when a game's first turn starts
    Run {
        /// JSONL event feed (defaults to stdin)
        #[arg(short, long)]
        events: Option<PathBuf>,
    },

    /// Report the game window, focus, and computed click points
    Check,

    /// Capture the probe region once and classify it
    Probe,

    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    autosquelch_common::logging::init_logging(&config.logging);
    config.validate()?;

    match cli.command {
        Commands::Run { events } => commands::run::run(config, events).await,
        Commands::Check => commands::check::run(&config),
        Commands::Probe => commands::probe::run(&config).await,
        Commands::Config { init } => commands::config::run(&config, cli.config, init),
    }
}
