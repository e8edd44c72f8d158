//! Report handlers
//!
//! Each report kind (day, week, month) has a preview form that returns the
//! rendered text and a send form that also pushes it over the chat
//! channel. Both recompute from a fresh ledger read on every request, so
//! repeating them is safe.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{AppError, AppState};
use tally_core::context::{build_daily_context, build_window_context, DEFAULT_TRAILING_DAYS};
use tally_core::dates::current_reference_year;
use tally_core::models::Transaction;
use tally_core::window::WindowKind;

/// Query parameters shared by the report routes
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Optional explicit anchor date (YYYY-MM-DD)
    pub date: Option<String>,
    /// Cron token for the send routes
    pub token: Option<String>,
}

/// A rendered report plus the window it actually covered
pub struct RenderedReport {
    pub body: String,
    pub date_used: Option<NaiveDate>,
    pub window: Option<(NaiveDate, NaiveDate)>,
}

/// GET /reports/:kind - Render a report without pushing it
pub async fn preview_report(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    let anchor = parse_anchor(params.date.as_deref())?;

    let report = render_report(&state, kind, anchor).await?;

    let text = match (kind, report.window) {
        (WindowKind::Day, _) | (_, None) => report.body,
        (_, Some((start, end))) => {
            format!("[{} used: {} → {}]\n{}", kind, start, end, report.body)
        }
    };

    Ok(([("content-type", "text/plain; charset=utf-8")], text).into_response())
}

/// POST /reports/:kind/send - Render a report and push it
pub async fn send_report(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_cron_token(&state, params.token.as_deref())?;

    let kind = parse_kind(&kind)?;
    let anchor = parse_anchor(params.date.as_deref())?;

    let report = render_report(&state, kind, anchor).await?;

    let push = state
        .push
        .as_ref()
        .ok_or_else(|| AppError::internal("Push channel not configured"))?;
    push.send(&report.body).await?;

    let mut response = serde_json::json!({
        "ok": true,
        "sent": report.body,
    });
    if let Some(date_used) = report.date_used {
        response["date_used"] = serde_json::json!(date_used);
    }
    if let Some((start, end)) = report.window {
        response["window"] = serde_json::json!([start, end]);
    }
    Ok(Json(response))
}

/// Render one report kind over a fresh ledger snapshot.
///
/// Empty windows short-circuit to a fixed "no expenses" message without
/// invoking the narrative LLM.
pub async fn render_report(
    state: &AppState,
    kind: WindowKind,
    anchor: Option<NaiveDate>,
) -> tally_core::Result<RenderedReport> {
    let rows: Vec<Transaction> = state.store.read_all_rows().await?;
    let tz = &state.config.timezone;
    let reference_year = current_reference_year(tz);

    match kind {
        WindowKind::Day => {
            let ctx = build_daily_context(&rows, anchor, DEFAULT_TRAILING_DAYS, tz, reference_year);
            let body = if ctx.today.count == 0 {
                format!("Daily summary for {}\nNo expenses logged.", ctx.date_used)
            } else {
                state
                    .llm
                    .summarize(&serde_json::to_string(&ctx)?)
                    .await?
            };
            Ok(RenderedReport {
                body,
                date_used: Some(ctx.date_used),
                window: None,
            })
        }
        WindowKind::Week | WindowKind::Month => {
            let ctx = build_window_context(&rows, kind, anchor, tz, reference_year);
            let (start, end) = (ctx.window.start, ctx.window.end);
            let body = if ctx.window.metrics.count == 0 {
                match kind {
                    WindowKind::Month => {
                        format!("Monthly summary {}\nNo expenses logged.", start.format("%Y-%m"))
                    }
                    _ => format!("Weekly summary {} → {}\nNo expenses logged.", start, end),
                }
            } else {
                state
                    .llm
                    .summarize(&serde_json::to_string(&ctx)?)
                    .await?
            };
            Ok(RenderedReport {
                body,
                date_used: None,
                window: Some((start, end)),
            })
        }
    }
}

fn parse_kind(kind: &str) -> Result<WindowKind, AppError> {
    kind.parse()
        .map_err(|e: String| AppError::bad_request(&e))
}

fn parse_anchor(date: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    date.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| AppError::bad_request("Invalid date format (use YYYY-MM-DD)"))
}

/// Reject send requests without the configured cron token.
/// No token configured means no guard.
fn check_cron_token(state: &AppState, provided: Option<&str>) -> Result<(), AppError> {
    match state.config.cron_token.as_deref() {
        None => Ok(()),
        Some(expected) if provided == Some(expected) => Ok(()),
        Some(_) => Err(AppError::unauthorized("Unauthorized")),
    }
}
