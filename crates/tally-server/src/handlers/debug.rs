//! Liveness and ledger introspection handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use tally_core::dates::{current_reference_year, local_today, resolve_row_date};
use tally_core::models::Transaction;

/// GET /health - Liveness probe
pub async fn health() -> &'static str {
    "ok"
}

/// Ledger snapshot for debugging date resolution
#[derive(Debug, Serialize)]
pub struct DebugRows {
    pub row_count: usize,
    pub today_local: String,
    pub todays_count: usize,
    pub first_rows: Vec<DebugRow>,
}

#[derive(Debug, Serialize)]
pub struct DebugRow {
    pub index: usize,
    pub resolved_date: Option<String>,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub aggregatable: bool,
}

/// GET /debug/rows - Row count plus how the first rows resolve
pub async fn debug_rows(State(state): State<Arc<AppState>>) -> Result<Json<DebugRows>, AppError> {
    let rows: Vec<Transaction> = state.store.read_all_rows().await?;
    let tz = &state.config.timezone;
    let reference_year = current_reference_year(tz);
    let today = local_today(tz);

    let first_rows = rows
        .iter()
        .take(20)
        .enumerate()
        .map(|(index, row)| DebugRow {
            index,
            resolved_date: resolve_row_date(row, tz, reference_year).map(|d| d.to_string()),
            amount: row.amount.clone(),
            category: row.category.clone(),
            aggregatable: row.is_aggregatable(),
        })
        .collect();

    let todays_count = rows
        .iter()
        .filter(|r| resolve_row_date(r, tz, reference_year) == Some(today))
        .count();

    Ok(Json(DebugRows {
        row_count: rows.len(),
        today_local: today.to_string(),
        todays_count,
        first_rows,
    }))
}
