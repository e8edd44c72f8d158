//! Reporting contexts
//!
//! A context bundles the aggregates for one window and its predecessor
//! into the JSON-serializable structure handed to narrative rendering.
//! Builders are pure functions over an in-memory snapshot of the ledger;
//! all I/O happens before they run.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::{aggregate, distinct_dates_with_data, round2, Aggregate};
use crate::dates::{available_dates, local_today};
use crate::models::Transaction;
use crate::window::{Window, WindowKind};

/// Default trailing window for the daily report.
pub const DEFAULT_TRAILING_DAYS: u32 = 7;

/// Context for the daily report: one day's metrics plus a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct DailyContext {
    /// The day actually reported on. Differs from the requested day when
    /// the daily trigger fired before any data for it existed.
    pub date_used: NaiveDate,
    pub today: Aggregate,
    pub last_window_days: u32,
    pub last_window: TrailingWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrailingWindow {
    pub total: f64,
    pub count: usize,
    pub avg_per_day: f64,
    pub by_category: crate::aggregate::OrderedSums,
}

/// Context for the calendar week/month reports.
#[derive(Debug, Clone, Serialize)]
pub struct WindowContext {
    pub label: WindowKind,
    pub window: WindowMetrics,
    pub previous_window: PreviousWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowMetrics {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: Aggregate,
    pub avg_per_day: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviousWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub metrics: Aggregate,
}

/// Build the daily context.
///
/// The target day is `requested`, or the current day in the ledger zone.
/// When the target has no rows but some earlier day does, the most recent
/// day with data substitutes; `date_used` records the substitution. The
/// trailing window always ends on the day used.
pub fn build_daily_context(
    rows: &[Transaction],
    requested: Option<NaiveDate>,
    window_days: u32,
    tz_name: &str,
    reference_year: i32,
) -> DailyContext {
    let mut date_used = requested.unwrap_or_else(|| local_today(tz_name));

    let day_set = |d: NaiveDate| std::iter::once(d).collect::<std::collections::HashSet<_>>();
    let mut today = aggregate(rows, Some(&day_set(date_used)), tz_name, reference_year);
    if today.count == 0 {
        if let Some(latest) = available_dates(rows, tz_name, reference_year).last().copied() {
            date_used = latest;
            today = aggregate(rows, Some(&day_set(date_used)), tz_name, reference_year);
        }
    }

    let window = Window::trailing_days(window_days, date_used);
    let days = window.date_set();
    let window_agg = aggregate(rows, Some(&days), tz_name, reference_year);
    let data_days = distinct_dates_with_data(rows, &days, tz_name, reference_year);
    let avg_per_day = if data_days == 0 {
        0.0
    } else {
        round2(window_agg.total / data_days as f64)
    };

    let window_agg = window_agg.rounded();
    DailyContext {
        date_used,
        today: today.rounded(),
        last_window_days: window_days,
        last_window: TrailingWindow {
            total: window_agg.total,
            count: window_agg.count,
            avg_per_day,
            by_category: window_agg.by_category,
        },
    }
}

/// Build a calendar week or month context with previous-period comparison.
///
/// The anchor is `requested`, or the most recent date with data, or the
/// current local day when the ledger is empty.
pub fn build_window_context(
    rows: &[Transaction],
    kind: WindowKind,
    requested: Option<NaiveDate>,
    tz_name: &str,
    reference_year: i32,
) -> WindowContext {
    let anchor = requested
        .or_else(|| available_dates(rows, tz_name, reference_year).last().copied())
        .unwrap_or_else(|| local_today(tz_name));

    let window = match kind {
        WindowKind::Week => Window::week_of(anchor),
        _ => Window::month_of(anchor),
    };
    let previous = window.previous();

    let days = window.date_set();
    let current = aggregate(rows, Some(&days), tz_name, reference_year);
    let prev_agg = aggregate(rows, Some(&previous.date_set()), tz_name, reference_year);

    let data_days = distinct_dates_with_data(rows, &days, tz_name, reference_year);
    let avg_per_day = if data_days == 0 {
        0.0
    } else {
        round2(current.total / data_days as f64)
    };

    WindowContext {
        label: window.kind,
        window: WindowMetrics {
            start: window.start,
            end: window.end,
            metrics: current.rounded(),
            avg_per_day,
        },
        previous_window: PreviousWindow {
            start: previous.start,
            end: previous.end,
            metrics: prev_agg.rounded(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TZ: &str = "America/Los_Angeles";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: &str, merchant: &str, amount: &str, category: &str) -> Transaction {
        Transaction::from_cells(&[
            "t".into(),
            date.into(),
            merchant.into(),
            amount.into(),
            "USD".into(),
            category.into(),
            "".into(),
            "text".into(),
            "m".into(),
        ])
    }

    #[test]
    fn daily_context_uses_requested_date_when_it_has_data() {
        let rows = vec![row("2025-06-01", "Cafe", "10", "eating_out")];
        let ctx = build_daily_context(&rows, Some(d(2025, 6, 1)), 7, TZ, 2025);
        assert_eq!(ctx.date_used, d(2025, 6, 1));
        assert_eq!(ctx.today.count, 1);
        assert_eq!(ctx.today.total, 10.0);
    }

    #[test]
    fn daily_context_falls_back_to_latest_date_with_data() {
        let rows = vec![
            row("2025-06-01", "Cafe", "10", "eating_out"),
            row("2025-06-03", "Shop", "20", "shopping"),
        ];
        // Requested day has no rows; the most recent day with data wins.
        let ctx = build_daily_context(&rows, Some(d(2025, 6, 10)), 7, TZ, 2025);
        assert_eq!(ctx.date_used, d(2025, 6, 3));
        assert_eq!(ctx.today.total, 20.0);
    }

    #[test]
    fn daily_context_on_empty_ledger_is_all_zeros() {
        let ctx = build_daily_context(&[], Some(d(2025, 6, 1)), 7, TZ, 2025);
        assert_eq!(ctx.date_used, d(2025, 6, 1));
        assert_eq!(ctx.today.count, 0);
        assert_eq!(ctx.today.total, 0.0);
        assert_eq!(ctx.last_window.count, 0);
        assert_eq!(ctx.last_window.avg_per_day, 0.0);
    }

    #[test]
    fn avg_per_day_divides_by_days_with_data() {
        let rows = vec![
            row("2025-06-01", "Cafe", "10", "eating_out"),
            row("2025-06-03", "Shop", "20", "shopping"),
        ];
        let ctx = build_daily_context(&rows, Some(d(2025, 6, 3)), 7, TZ, 2025);
        // Two days with data inside the 7-day window, not seven.
        assert_eq!(ctx.last_window.total, 30.0);
        assert_eq!(ctx.last_window.avg_per_day, 15.0);
    }

    #[test]
    fn week_context_compares_adjacent_weeks() {
        let rows = vec![
            row("2025-06-04", "Cafe", "30", "eating_out"),
            row("2025-05-28", "Cafe", "10", "eating_out"),
        ];
        let ctx = build_window_context(&rows, WindowKind::Week, Some(d(2025, 6, 4)), TZ, 2025);
        assert_eq!(ctx.label, WindowKind::Week);
        assert_eq!(ctx.window.start, d(2025, 6, 2));
        assert_eq!(ctx.window.end, d(2025, 6, 8));
        assert_eq!(ctx.window.metrics.total, 30.0);
        assert_eq!(ctx.previous_window.start, d(2025, 5, 26));
        assert_eq!(ctx.previous_window.end, d(2025, 6, 1));
        assert_eq!(ctx.previous_window.metrics.total, 10.0);
    }

    #[test]
    fn month_context_anchors_on_latest_data_date() {
        let rows = vec![row("2025-06-15", "Cafe", "30", "eating_out")];
        let ctx = build_window_context(&rows, WindowKind::Month, None, TZ, 2025);
        assert_eq!(ctx.window.start, d(2025, 6, 1));
        assert_eq!(ctx.window.end, d(2025, 6, 30));
        assert_eq!(ctx.previous_window.start, d(2025, 5, 1));
        assert_eq!(ctx.previous_window.end, d(2025, 5, 31));
    }

    #[test]
    fn context_serializes_with_iso_dates() {
        let rows = vec![row("2025-06-15", "Cafe", "30", "eating_out")];
        let ctx = build_window_context(&rows, WindowKind::Month, None, TZ, 2025);
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["label"], "month");
        assert_eq!(json["window"]["start"], "2025-06-01");
        assert_eq!(json["window"]["metrics"]["by_merchant"]["Cafe"], 30.0);
    }
}
