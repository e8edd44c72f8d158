//! Report rendering commands

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use tally_core::window::WindowKind;
use tally_core::Config;
use tally_server::{render_report, AppState};

pub async fn cmd_report(kind: &str, date: Option<&str>, send: bool) -> Result<()> {
    let kind: WindowKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let anchor = date
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("Invalid --date format (use YYYY-MM-DD)")?;

    debug!(kind = %kind, anchor = ?anchor, "Rendering report");
    let state = Arc::new(AppState::from_config(Config::from_env())?);
    let report = render_report(&state, kind, anchor).await?;

    if let Some(date_used) = report.date_used {
        println!("📅 Date used: {}", date_used);
    }
    if let Some((start, end)) = report.window {
        println!("📅 Window: {} → {}", start, end);
    }
    println!();
    println!("{}", report.body);

    if send {
        let push = match state.push.as_ref() {
            Some(push) => push,
            None => bail!("Push channel not configured (set TWILIO_* variables)"),
        };
        push.send(&report.body).await?;
        println!();
        println!("✅ Report pushed over the chat channel");
    }

    Ok(())
}
