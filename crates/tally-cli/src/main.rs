//! Tally CLI - Chat-channel expense ledger bot
//!
//! Usage:
//!   tally serve --port 3000      Start webhook + report server
//!   tally report week            Render a report to stdout
//!   tally report day --send     Render and push over the chat channel
//!   tally extract "coffee 4.5"  Dry-run LLM extraction
//!   tally status                 Show configured collaborators

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve { port, host } => commands::cmd_serve(&host, port).await,
        Commands::Report { kind, date, send } => {
            commands::cmd_report(&kind, date.as_deref(), send).await
        }
        Commands::Extract { text } => commands::cmd_extract(&text).await,
        Commands::Status => commands::cmd_status().await,
    }
}
