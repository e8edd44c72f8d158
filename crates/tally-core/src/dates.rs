//! Date normalization and row date resolution
//!
//! Ledger cells arrive in several encodings: loose ISO (`2025-6-1`), slash
//! dates (`6/1/2025`, `6/1/25`), month names (`Jun 1, 2025`), and raw
//! spreadsheet serial numbers. This module turns any of them into one
//! canonical `NaiveDate`, and derives a calendar day for rows whose date
//! cell is missing by shifting the recorded UTC timestamp into the ledger's
//! local time zone.
//!
//! Nothing here raises: a value that fails every encoding (or fails real
//! calendar validation, e.g. Feb 30) resolves to `None` and the row simply
//! drops out of date-keyed aggregation.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::models::Transaction;

/// Spreadsheet serial number epoch (Google Sheets / Excel, 1900 system).
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Largest serial treated as a date: 9999-12-31. Anything beyond the
/// four-digit-year calendar is noise (a phone number, an ID), not a date.
const MAX_SERIAL: i64 = 2_958_465;

/// Offset applied when the configured zone name has no tz data:
/// a fixed UTC-8 approximation of the default ledger zone.
const FALLBACK_OFFSET_SECS: i32 = -8 * 3600;

/// Normalize an arbitrary date cell into a canonical calendar date.
///
/// Encodings are tried in a fixed priority order and the first match wins.
/// `reference_year` fills in month-name dates written without a year
/// ("Aug 23"). Callers pass the current year in the ledger zone, which
/// means a row parsed long after ingestion can land in the wrong year;
/// the parameter exists so tests (and backfills) can pin it.
pub fn normalize_cell_date(cell: &str, reference_year: i32) -> Option<NaiveDate> {
    let s = cell.trim();
    if s.is_empty() {
        return None;
    }

    // ISO loose: YYYY-M-D
    let iso = Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex");
    if let Some(caps) = iso.captures(s) {
        let y: i32 = caps[1].parse().ok()?;
        let mo: u32 = caps[2].parse().ok()?;
        let d: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(y, mo, d);
    }

    // M/D/YYYY or M/D/YY (two-digit years mean 2000+YY)
    let slash = Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").expect("valid regex");
    if let Some(caps) = slash.captures(s) {
        let mo: u32 = caps[1].parse().ok()?;
        let d: u32 = caps[2].parse().ok()?;
        let mut y: i32 = caps[3].parse().ok()?;
        if y < 100 {
            y += 2000;
        }
        return NaiveDate::from_ymd_opt(y, mo, d);
    }

    // Month name: "Aug 23, 2025" / "August 23 2025" / "aug 23"
    let month_name = Regex::new(r"^([A-Za-z]+)\s+(\d{1,2})(?:,?\s*(\d{4}))?$").expect("valid regex");
    if let Some(caps) = month_name.captures(s) {
        let mo = month_number(&caps[1])?;
        let d: u32 = caps[2].parse().ok()?;
        let y: i32 = match caps.get(3) {
            Some(m) => m.as_str().parse().ok()?,
            None => reference_year,
        };
        return NaiveDate::from_ymd_opt(y, mo, d);
    }

    // All-digit: spreadsheet serial number, one unit per day
    if s.chars().all(|c| c.is_ascii_digit()) {
        let serial: i64 = s.parse().ok()?;
        if serial > MAX_SERIAL {
            return None;
        }
        let (y, m, d) = SERIAL_EPOCH;
        let epoch = NaiveDate::from_ymd_opt(y, m, d).expect("valid epoch");
        return epoch.checked_add_signed(Duration::days(serial));
    }

    None
}

/// Match a month name by its first three letters, case-insensitive.
fn month_number(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    let prefix = name[..3].to_lowercase();
    let months = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    months
        .iter()
        .position(|m| *m == prefix)
        .map(|i| (i + 1) as u32)
}

/// Resolve the canonical calendar date for one transaction.
///
/// The date cell wins when it parses. Otherwise the creation timestamp is
/// read as a UTC instant (trailing `Z`, explicit offset, or naive text
/// assumed UTC) and shifted into the ledger zone; the zone's calendar day
/// is the answer. Rows with neither resolve to `None`.
pub fn resolve_row_date(tx: &Transaction, tz_name: &str, reference_year: i32) -> Option<NaiveDate> {
    if let Some(cell) = tx.date.as_deref() {
        if let Some(date) = normalize_cell_date(cell, reference_year) {
            return Some(date);
        }
    }

    let ts = tx.logged_at.as_deref()?.trim();
    let utc = parse_utc_instant(ts)?;
    Some(to_local_date(utc, tz_name))
}

/// Parse a timestamp cell as a UTC instant.
fn parse_utc_instant(ts: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive ISO text is assumed to already be UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(ndt.and_utc());
        }
    }
    None
}

/// Convert a UTC instant into the ledger zone's calendar day.
///
/// When `tz_name` does not resolve to tz data, falls back to a fixed
/// UTC-8 offset rather than failing the row.
pub fn to_local_date(utc: DateTime<Utc>, tz_name: &str) -> NaiveDate {
    match tz_name.parse::<Tz>() {
        Ok(tz) => utc.with_timezone(&tz).date_naive(),
        Err(_) => {
            let offset = FixedOffset::east_opt(FALLBACK_OFFSET_SECS).expect("valid offset");
            utc.with_timezone(&offset).date_naive()
        }
    }
}

/// The current calendar day in the ledger zone.
pub fn local_today(tz_name: &str) -> NaiveDate {
    to_local_date(Utc::now(), tz_name)
}

/// Exactly `n` consecutive days ending at `end_date`, most recent first.
/// Days without data are included; filtering happens at aggregation.
pub fn last_n_days(n: u32, end_date: NaiveDate) -> Vec<NaiveDate> {
    (0..n as i64)
        .filter_map(|i| end_date.checked_sub_signed(Duration::days(i)))
        .collect()
}

/// All distinct resolved dates present in the ledger, ascending.
pub fn available_dates(rows: &[Transaction], tz_name: &str, reference_year: i32) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows
        .iter()
        .filter_map(|r| resolve_row_date(r, tz_name, reference_year))
        .collect();
    dates.sort();
    dates.dedup();
    dates
}

/// The current year in the ledger zone, the default reference year for
/// month-name dates written without one.
pub fn current_reference_year(tz_name: &str) -> i32 {
    local_today(tz_name).year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    const TZ: &str = "America/Los_Angeles";

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn equivalent_encodings_normalize_identically() {
        let expect = Some(d(2025, 8, 23));
        assert_eq!(normalize_cell_date("2025-8-23", 2025), expect);
        assert_eq!(normalize_cell_date("2025-08-23", 2025), expect);
        assert_eq!(normalize_cell_date("8/23/2025", 2025), expect);
        assert_eq!(normalize_cell_date("8/23/25", 2025), expect);
        assert_eq!(normalize_cell_date("Aug 23, 2025", 2025), expect);
        assert_eq!(normalize_cell_date("august 23 2025", 2025), expect);
    }

    #[test]
    fn month_name_without_year_uses_reference_year() {
        assert_eq!(normalize_cell_date("Aug 23", 2024), Some(d(2024, 8, 23)));
        assert_eq!(normalize_cell_date("Aug 23", 2025), Some(d(2025, 8, 23)));
    }

    #[test]
    fn serial_numbers_use_sheet_epoch() {
        // 1899-12-30 + 1 day
        assert_eq!(normalize_cell_date("1", 2025), Some(d(1899, 12, 31)));
        // A real-world serial: 2025-08-23
        assert_eq!(normalize_cell_date("45892", 2025), Some(d(2025, 8, 23)));
    }

    #[test]
    fn serials_past_year_9999_are_rejected() {
        // Largest representable serial maps to the calendar's last day.
        assert_eq!(normalize_cell_date("2958465", 2025), Some(d(9999, 12, 31)));
        assert_eq!(normalize_cell_date("2958466", 2025), None);
        // An all-digit ISO date like 20250101 is a huge serial, not a date.
        assert_eq!(normalize_cell_date("20250101", 2025), None);
    }

    #[test]
    fn calendar_invalid_inputs_yield_none() {
        assert_eq!(normalize_cell_date("2025-02-30", 2025), None);
        assert_eq!(normalize_cell_date("2025-13-01", 2025), None);
        assert_eq!(normalize_cell_date("13/40/2025", 2025), None);
        assert_eq!(normalize_cell_date("Feb 30, 2025", 2025), None);
        assert_eq!(normalize_cell_date("not a date", 2025), None);
        assert_eq!(normalize_cell_date("", 2025), None);
    }

    #[test]
    fn leap_day_is_valid_only_in_leap_years() {
        assert_eq!(normalize_cell_date("2024-02-29", 2024), Some(d(2024, 2, 29)));
        assert_eq!(normalize_cell_date("2025-02-29", 2025), None);
    }

    #[test]
    fn date_cell_wins_over_timestamp() {
        let tx = Transaction::from_cells(&[
            "2025-06-03T01:00:00Z".into(),
            "6/1/2025".into(),
        ]);
        assert_eq!(resolve_row_date(&tx, TZ, 2025), Some(d(2025, 6, 1)));
    }

    #[test]
    fn timestamp_fallback_same_day_after_offset() {
        // 09:00 UTC is 02:00 in Los Angeles (UTC-7 in June): same calendar day.
        let tx = Transaction::from_cells(&["2025-06-02T09:00:00Z".into()]);
        assert_eq!(resolve_row_date(&tx, TZ, 2025), Some(d(2025, 6, 2)));
    }

    #[test]
    fn timestamp_fallback_crosses_midnight() {
        // 03:00 UTC on June 2 is 20:00 June 1 in Los Angeles.
        let tx = Transaction::from_cells(&["2025-06-02T03:00:00Z".into()]);
        assert_eq!(resolve_row_date(&tx, TZ, 2025), Some(d(2025, 6, 1)));
    }

    #[test]
    fn naive_timestamp_is_assumed_utc() {
        let tx = Transaction::from_cells(&["2025-06-02T03:00:00".into()]);
        assert_eq!(resolve_row_date(&tx, TZ, 2025), Some(d(2025, 6, 1)));
    }

    #[test]
    fn unknown_zone_falls_back_to_fixed_utc_minus_8() {
        let utc = DateTime::parse_from_rfc3339("2025-06-02T03:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_local_date(utc, "Not/AZone"), d(2025, 6, 1));
    }

    #[test]
    fn no_date_and_no_timestamp_resolves_to_none() {
        let tx = Transaction::from_cells(&["".into(), "garbage".into()]);
        assert_eq!(resolve_row_date(&tx, TZ, 2025), None);
    }

    #[test]
    fn last_n_days_counts_back_inclusively() {
        let days = last_n_days(7, d(2025, 6, 7));
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d(2025, 6, 7));
        assert_eq!(days[6], d(2025, 6, 1));
    }

    #[test]
    fn available_dates_are_sorted_and_deduped() {
        let rows = vec![
            Transaction::from_cells(&["t".into(), "2025-06-03".into()]),
            Transaction::from_cells(&["t".into(), "2025-06-01".into()]),
            Transaction::from_cells(&["t".into(), "2025-06-03".into()]),
            Transaction::from_cells(&["".into(), "garbage".into()]),
        ];
        assert_eq!(
            available_dates(&rows, TZ, 2025),
            vec![d(2025, 6, 1), d(2025, 6, 3)]
        );
    }
}
