//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use clap::{Parser, Subcommand};

/// Tally - Chat-channel expense ledger bot
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Expense bot: chat ingestion, shared ledger, LLM summaries", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (webhook + report routes)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Render a spending report from the ledger
    Report {
        /// Report kind: day, week, month
        #[arg(default_value = "day")]
        kind: String,

        /// Anchor date (YYYY-MM-DD, defaults to today in the ledger zone)
        #[arg(short, long)]
        date: Option<String>,

        /// Also push the report over the chat channel
        #[arg(long)]
        send: bool,
    },

    /// Run LLM extraction on a message without logging it
    Extract {
        /// Message text to extract an expense from
        text: String,
    },

    /// Show which collaborators are configured
    Status,
}
