//! Background scheduler for pushed reports
//!
//! Deployments without an external cron can enable an in-process schedule
//! via environment variables:
//!
//! - `TALLY_REPORT_SCHEDULE`: Interval in hours (e.g., "24" for daily)
//!
//! Each tick renders the daily report and pushes it over the chat channel.
//! A failed tick is logged and the schedule keeps running; pushes are
//! recomputed every time, so a missed or repeated tick is harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use crate::handlers::render_report;
use crate::AppState;
use tally_core::window::WindowKind;

/// Configuration for scheduled report pushes
#[derive(Debug, Clone)]
pub struct ReportScheduleConfig {
    /// Interval between pushes in hours
    pub interval_hours: u64,
}

impl ReportScheduleConfig {
    /// Parse configuration from environment variables
    ///
    /// Returns None if scheduling is not configured (TALLY_REPORT_SCHEDULE not set)
    pub fn from_env() -> Option<Self> {
        let interval_hours: u64 = std::env::var("TALLY_REPORT_SCHEDULE")
            .ok()
            .and_then(|s| s.parse().ok())?;

        if interval_hours == 0 {
            warn!("TALLY_REPORT_SCHEDULE is 0, scheduled reports disabled");
            return None;
        }

        Some(Self { interval_hours })
    }
}

/// Start the report scheduler as a background task
pub fn start_report_scheduler(state: Arc<AppState>, config: ReportScheduleConfig) {
    if state.push.is_none() {
        warn!("Report schedule configured but no push channel; skipping scheduler");
        return;
    }

    info!(
        "Starting report scheduler: daily report every {} hours",
        config.interval_hours
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(config.interval_hours * 3600));

        // Skip the first immediate tick - no push on startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let report = match render_report(&state, WindowKind::Day, None).await {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, "Scheduled report rendering failed");
                    continue;
                }
            };

            let push = match state.push.as_ref() {
                Some(push) => push,
                None => continue,
            };

            match push.send(&report.body).await {
                Ok(()) => info!("Scheduled report pushed"),
                Err(e) => error!(error = %e, "Scheduled report push failed"),
            }
        }
    });
}
