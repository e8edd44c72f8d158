//! One-pass aggregation of ledger rows
//!
//! Sums, counts, per-category and per-merchant totals over an optional set
//! of canonical dates. Accumulation is unrounded; rounding to cents happens
//! once, at the reporting boundary, so repeated sums do not compound error.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::dates::resolve_row_date;
use crate::models::Transaction;

/// Summed amounts keyed by name, in first-encountered order.
///
/// Insertion order matters: when two keys tie for the largest sum, the one
/// seen first during accumulation wins. A plain HashMap would make that
/// tie-break nondeterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedSums(Vec<(String, f64)>);

impl OrderedSums {
    pub fn add(&mut self, key: &str, amount: f64) {
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some((_, sum)) => *sum += amount,
            None => self.0.push((key.to_string(), amount)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// The key with the largest sum; first-encountered wins ties.
    pub fn top(&self) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (key, sum) in self.iter() {
            match best {
                Some((_, max)) if sum <= max => {}
                _ => best = Some((key, sum)),
            }
        }
        best.map(|(k, _)| k)
    }

    fn rounded(&self) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), round2(*v))).collect())
    }
}

impl Serialize for OrderedSums {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Aggregate metrics over a collection of rows
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    pub total: f64,
    pub count: usize,
    pub by_category: OrderedSums,
    pub by_merchant: OrderedSums,
    pub top_category: Option<String>,
    pub top_merchant: Option<String>,
}

impl Aggregate {
    /// Rounded-to-cents copy for reporting. Accumulated values stay exact
    /// until this point.
    pub fn rounded(&self) -> Self {
        Self {
            total: round2(self.total),
            count: self.count,
            by_category: self.by_category.rounded(),
            by_merchant: self.by_merchant.rounded(),
            top_category: self.top_category.clone(),
            top_merchant: self.top_merchant.clone(),
        }
    }
}

/// Aggregate rows whose resolved date falls in `filter`, or every
/// well-formed row when no filter is given.
///
/// Malformed rows (too few cells) are always excluded. With a filter, rows
/// with no resolvable date are excluded too; without one they still count.
pub fn aggregate(
    rows: &[Transaction],
    filter: Option<&HashSet<NaiveDate>>,
    tz_name: &str,
    reference_year: i32,
) -> Aggregate {
    let mut agg = Aggregate::default();

    for row in rows {
        if !row.is_aggregatable() {
            continue;
        }
        if let Some(days) = filter {
            match resolve_row_date(row, tz_name, reference_year) {
                Some(date) if days.contains(&date) => {}
                _ => continue,
            }
        }

        let amount = row.amount_value().or_zero();
        agg.total += amount;
        agg.count += 1;
        agg.by_category.add(row.category_or_default(), amount);
        agg.by_merchant.add(row.merchant_or_default(), amount);
    }

    agg.top_category = agg.by_category.top().map(str::to_string);
    agg.top_merchant = agg.by_merchant.top().map(str::to_string);
    agg
}

/// Distinct resolved dates with at least one row in `days`.
///
/// Average-per-day divides by this, not by the calendar length of the
/// window: days without data do not dilute the average.
pub fn distinct_dates_with_data(
    rows: &[Transaction],
    days: &HashSet<NaiveDate>,
    tz_name: &str,
    reference_year: i32,
) -> usize {
    let mut seen = HashSet::new();
    for row in rows {
        if let Some(date) = resolve_row_date(row, tz_name, reference_year) {
            if days.contains(&date) {
                seen.insert(date);
            }
        }
    }
    seen.len()
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    const TZ: &str = "America/Los_Angeles";

    fn row(cells: &[&str]) -> Transaction {
        let owned: Vec<String> = cells.iter().map(|s| s.to_string()).collect();
        Transaction::from_cells(&owned)
    }

    fn sample_rows() -> Vec<Transaction> {
        vec![
            row(&["t", "2025-06-01", "Cafe", "12.5", "USD", "eating_out", "", "text", "m1"]),
            row(&["t", "2025-06-01", "Cafe", "7.5", "USD", "eating_out", "", "text", "m2"]),
            row(&["t", "2025-06-01", "Shop", "20", "USD", "shopping", "", "text", "m3"]),
        ]
    }

    #[test]
    fn empty_input_yields_zero_aggregate() {
        let agg = aggregate(&[], None, TZ, 2025);
        assert_eq!(agg.total, 0.0);
        assert_eq!(agg.count, 0);
        assert!(agg.by_category.is_empty());
        assert_eq!(agg.top_category, None);
        assert_eq!(agg.top_merchant, None);
    }

    #[test]
    fn worked_example_totals_and_tops() {
        let agg = aggregate(&sample_rows(), None, TZ, 2025);
        assert_eq!(agg.total, 40.0);
        assert_eq!(agg.count, 3);
        assert_eq!(agg.by_category.get("eating_out"), Some(20.0));
        assert_eq!(agg.by_category.get("shopping"), Some(20.0));
        // Cafe and Shop both sum to 20.0; Cafe was seen first.
        assert_eq!(agg.top_merchant.as_deref(), Some("Cafe"));
        assert_eq!(agg.top_category.as_deref(), Some("eating_out"));
    }

    #[test]
    fn malformed_rows_are_excluded() {
        let mut rows = sample_rows();
        rows.push(row(&["t", "2025-06-01", "Ghost", "99"]));
        let agg = aggregate(&rows, None, TZ, 2025);
        assert_eq!(agg.count, 3);
        assert_eq!(agg.total, 40.0);
    }

    #[test]
    fn unparsable_amounts_count_as_zero() {
        let rows = vec![row(&["t", "2025-06-01", "Cafe", "n/a", "USD", "eating_out"])];
        let agg = aggregate(&rows, None, TZ, 2025);
        assert_eq!(agg.count, 1);
        assert_eq!(agg.total, 0.0);
    }

    #[test]
    fn defaults_apply_for_missing_merchant_and_category() {
        let rows = vec![row(&["t", "2025-06-01", "", "5", "USD", ""])];
        let agg = aggregate(&rows, None, TZ, 2025);
        assert_eq!(agg.top_merchant.as_deref(), Some("Unknown"));
        assert_eq!(agg.top_category.as_deref(), Some("other"));
    }

    #[test]
    fn date_filter_excludes_out_of_window_rows() {
        let mut rows = sample_rows();
        rows.push(row(&["t", "2025-05-20", "Cafe", "100", "USD", "eating_out", "", "text", "m4"]));
        let days: HashSet<NaiveDate> =
            [NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()].into_iter().collect();
        let agg = aggregate(&rows, Some(&days), TZ, 2025);
        assert_eq!(agg.count, 3);
        assert_eq!(agg.total, 40.0);
    }

    #[test]
    fn filter_excludes_rows_with_no_resolvable_date() {
        let rows = vec![row(&["", "??", "Cafe", "5", "USD", "eating_out"])];
        let days: HashSet<NaiveDate> =
            [NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()].into_iter().collect();
        let agg = aggregate(&rows, Some(&days), TZ, 2025);
        assert_eq!(agg.count, 0);
        // Unfiltered, the same row still appears.
        assert_eq!(aggregate(&rows, None, TZ, 2025).count, 1);
    }

    #[test]
    fn rounding_happens_only_at_reporting() {
        let rows = vec![
            row(&["t", "2025-06-01", "A", "0.105", "USD", "c"]),
            row(&["t", "2025-06-01", "A", "0.105", "USD", "c"]),
        ];
        let agg = aggregate(&rows, None, TZ, 2025);
        assert!((agg.total - 0.21).abs() < 1e-12);
        assert_eq!(agg.rounded().total, 0.21);
    }

    #[test]
    fn ordered_sums_serialize_as_a_map() {
        let agg = aggregate(&sample_rows(), None, TZ, 2025);
        let json = serde_json::to_value(&agg.rounded()).unwrap();
        assert_eq!(json["by_category"]["eating_out"], 20.0);
        assert_eq!(json["by_merchant"]["Shop"], 20.0);
    }

    #[test]
    fn distinct_dates_ignores_empty_days() {
        let rows = sample_rows();
        let days: HashSet<NaiveDate> = (1..=7)
            .map(|d| NaiveDate::from_ymd_opt(2025, 6, d).unwrap())
            .collect();
        assert_eq!(distinct_dates_with_data(&rows, &days, TZ, 2025), 1);
    }
}
