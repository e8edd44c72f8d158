//! Report windows
//!
//! A window is an inclusive [start, end] date range with a kind. Every
//! window has a deterministic previous window of the same kind and length
//! immediately before it, with no gap or overlap; reports compare the two.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Day,
    Week,
    Month,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::str::FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            _ => Err(format!("Unknown report kind: {}", s)),
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive date range plus its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: WindowKind,
}

impl Window {
    /// The ISO week (Monday through Sunday) containing `anchor`.
    pub fn week_of(anchor: NaiveDate) -> Self {
        let start = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
        Self {
            start,
            end: start + Duration::days(6),
            kind: WindowKind::Week,
        }
    }

    /// The full calendar month containing `anchor`.
    pub fn month_of(anchor: NaiveDate) -> Self {
        let start = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1).expect("valid first day");
        Self {
            start,
            end: last_day_of_month(anchor.year(), anchor.month()),
            kind: WindowKind::Month,
        }
    }

    /// A trailing `n`-day window ending at `end` (inclusive).
    pub fn trailing_days(n: u32, end: NaiveDate) -> Self {
        let span = (n.max(1) - 1) as i64;
        Self {
            start: end - Duration::days(span),
            end,
            kind: WindowKind::Day,
        }
    }

    /// The window of the same kind and length ending exactly one day
    /// before this one starts.
    pub fn previous(&self) -> Self {
        match self.kind {
            WindowKind::Month => {
                let (py, pm) = if self.start.month() == 1 {
                    (self.start.year() - 1, 12)
                } else {
                    (self.start.year(), self.start.month() - 1)
                };
                Self {
                    start: NaiveDate::from_ymd_opt(py, pm, 1).expect("valid first day"),
                    end: last_day_of_month(py, pm),
                    kind: WindowKind::Month,
                }
            }
            _ => {
                let len = (self.end - self.start).num_days();
                let end = self.start - Duration::days(1);
                Self {
                    start: end - Duration::days(len),
                    end,
                    kind: self.kind,
                }
            }
        }
    }

    /// Every calendar day in the window, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let len = (self.end - self.start).num_days();
        (0..=len).map(|i| self.start + Duration::days(i)).collect()
    }

    /// The window's member days as a set, for aggregation filters.
    pub fn date_set(&self) -> HashSet<NaiveDate> {
        self.dates().into_iter().collect()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Real calendar month length, leap-aware.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .expect("valid first day")
        .pred_opt()
        .expect("valid last day")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_runs_monday_through_sunday() {
        // 2025-06-04 is a Wednesday.
        let w = Window::week_of(d(2025, 6, 4));
        assert_eq!(w.start, d(2025, 6, 2));
        assert_eq!(w.end, d(2025, 6, 8));
        // Anchoring on the Monday or the Sunday gives the same week.
        assert_eq!(Window::week_of(d(2025, 6, 2)), w);
        assert_eq!(Window::week_of(d(2025, 6, 8)), w);
    }

    #[test]
    fn month_spans_true_calendar_length() {
        assert_eq!(Window::month_of(d(2025, 2, 14)).end, d(2025, 2, 28));
        assert_eq!(Window::month_of(d(2024, 2, 14)).end, d(2024, 2, 29));
        assert_eq!(Window::month_of(d(2025, 4, 1)).end, d(2025, 4, 30));
        assert_eq!(Window::month_of(d(2025, 12, 31)).end, d(2025, 12, 31));
        assert_eq!(Window::month_of(d(2024, 2, 14)).dates().len(), 29);
    }

    #[test]
    fn previous_week_is_adjacent_with_no_gap() {
        let w = Window::week_of(d(2025, 6, 4));
        let prev = w.previous();
        assert_eq!(prev.end + Duration::days(1), w.start);
        assert_eq!((prev.end - prev.start).num_days(), 6);
    }

    #[test]
    fn previous_month_wraps_the_year() {
        let jan = Window::month_of(d(2025, 1, 15));
        let prev = jan.previous();
        assert_eq!(prev.start, d(2024, 12, 1));
        assert_eq!(prev.end, d(2024, 12, 31));
        assert_eq!(prev.end + Duration::days(1), jan.start);
    }

    #[test]
    fn previous_month_keeps_its_own_length() {
        // March's previous month is February, 28 days in 2025.
        let mar = Window::month_of(d(2025, 3, 10));
        let feb = mar.previous();
        assert_eq!(feb.start, d(2025, 2, 1));
        assert_eq!(feb.end, d(2025, 2, 28));
    }

    #[test]
    fn trailing_days_window_is_inclusive() {
        let w = Window::trailing_days(7, d(2025, 6, 7));
        assert_eq!(w.start, d(2025, 6, 1));
        assert_eq!(w.dates().len(), 7);
        assert!(w.contains(d(2025, 6, 1)));
        assert!(w.contains(d(2025, 6, 7)));
        assert!(!w.contains(d(2025, 5, 31)));
    }
}
