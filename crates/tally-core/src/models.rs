//! Domain models for Tally
//!
//! The ledger stores one transaction per spreadsheet row with a fixed
//! nine-column layout (`A:I`). The positional layout exists only at the
//! store boundary; everything else works with named fields.

use serde::{Deserialize, Serialize};

/// How a transaction entered the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Extracted from a plain chat message
    #[default]
    Text,
    /// Extracted from a photographed receipt via OCR
    Image,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
        }
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(format!("Unknown source: {}", s)),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Best-effort numeric parse of an amount cell
///
/// Aggregation treats anything that is not a number as zero, but callers
/// that care can still tell a parsed value from a defaulted one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum AmountValue {
    Parsed(f64),
    Missing,
    Unparsable,
}

impl AmountValue {
    pub fn parse(cell: Option<&str>) -> Self {
        match cell.map(str::trim) {
            None | Some("") => Self::Missing,
            Some(s) => match s.parse::<f64>() {
                Ok(v) => Self::Parsed(v),
                Err(_) => Self::Unparsable,
            },
        }
    }

    /// The value aggregation uses: parsed amount, or 0.0 when the cell was
    /// missing or unparsable.
    pub fn or_zero(&self) -> f64 {
        match self {
            Self::Parsed(v) => *v,
            Self::Missing | Self::Unparsable => 0.0,
        }
    }
}

/// Column count of the ledger row layout
pub const LEDGER_COLUMNS: usize = 9;

/// Rows carrying fewer cells than this are considered malformed and are
/// excluded from aggregation entirely.
pub const MIN_POPULATED_CELLS: usize = 6;

/// One logged expense
///
/// Every field is optional because spreadsheet rows arrive with arbitrary
/// gaps; aggregation applies the documented defaults instead of failing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Creation timestamp text (ISO-8601, UTC, may lack a zone marker)
    pub logged_at: Option<String>,
    /// Free-form transaction date text, authoritative when parseable
    pub date: Option<String>,
    /// Merchant or payer name
    pub merchant: Option<String>,
    /// Amount as numeric text
    pub amount: Option<String>,
    /// Currency code (not used in aggregation)
    pub currency: Option<String>,
    /// Spending category
    pub category: Option<String>,
    /// Free-text note
    pub note: Option<String>,
    /// Ingestion source tag
    pub source: Option<Source>,
    /// Channel message identifier (audit aid, not enforced unique)
    pub message_id: Option<String>,
    /// Cell count of the raw row this transaction was read from
    #[serde(skip)]
    populated: usize,
}

impl Transaction {
    /// Build a transaction from a raw store row (header already stripped).
    ///
    /// The store trims trailing empty cells, so the cell count is what the
    /// malformed-row invariant is measured against.
    pub fn from_cells(cells: &[String]) -> Self {
        let cell = |i: usize| -> Option<String> {
            cells
                .get(i)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            logged_at: cell(0),
            date: cell(1),
            merchant: cell(2),
            amount: cell(3),
            currency: cell(4),
            category: cell(5),
            note: cell(6),
            source: cell(7).and_then(|s| s.parse().ok()),
            message_id: cell(8),
            populated: cells.len(),
        }
    }

    /// The nine-cell row appended to the store. Absent fields become empty
    /// cells so column positions stay stable.
    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.logged_at.clone().unwrap_or_default(),
            self.date.clone().unwrap_or_default(),
            self.merchant.clone().unwrap_or_default(),
            self.amount.clone().unwrap_or_default(),
            self.currency.clone().unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
            self.note.clone().unwrap_or_default(),
            self.source.map(|s| s.as_str().to_string()).unwrap_or_default(),
            self.message_id.clone().unwrap_or_default(),
        ]
    }

    /// Whether this row carries enough cells to take part in aggregation.
    /// A row below the threshold is skipped even if its date resolves.
    pub fn is_aggregatable(&self) -> bool {
        self.populated >= MIN_POPULATED_CELLS
    }

    pub fn amount_value(&self) -> AmountValue {
        AmountValue::parse(self.amount.as_deref())
    }

    pub fn merchant_or_default(&self) -> &str {
        self.merchant.as_deref().unwrap_or("Unknown")
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("other")
    }
}

/// Structured expense data extracted by the LLM from one chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub name: String,
    pub amount: Option<f64>,
    pub currency: String,
    pub category: String,
    /// Strict `YYYY-MM-DD` or absent; the ingestion layer fills in the
    /// local "today" when the model returned nothing usable.
    pub date: Option<String>,
    pub notes: String,
}

impl ExpenseDraft {
    /// Assemble the ledger row for this draft.
    pub fn into_transaction(self, logged_at: String, source: Source, message_id: &str) -> Transaction {
        Transaction {
            logged_at: Some(logged_at),
            date: self.date,
            merchant: Some(self.name),
            amount: self.amount.map(|a| a.to_string()),
            currency: Some(self.currency),
            category: Some(self.category),
            note: Some(self.notes),
            source: Some(source),
            message_id: Some(message_id.to_string()),
            populated: LEDGER_COLUMNS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cells_trims_and_drops_empty() {
        let tx = Transaction::from_cells(&[
            "2025-06-01T12:00:00Z".into(),
            " 2025-06-01 ".into(),
            "".into(),
            "12.50".into(),
            "USD".into(),
            "eating_out".into(),
        ]);
        assert_eq!(tx.date.as_deref(), Some("2025-06-01"));
        assert_eq!(tx.merchant, None);
        assert_eq!(tx.merchant_or_default(), "Unknown");
        assert!(tx.is_aggregatable());
    }

    #[test]
    fn short_rows_are_not_aggregatable() {
        let tx = Transaction::from_cells(&[
            "2025-06-01T12:00:00Z".into(),
            "2025-06-01".into(),
            "Cafe".into(),
        ]);
        assert!(!tx.is_aggregatable());
        // The date is still resolvable on its own.
        assert_eq!(tx.date.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn amount_value_distinguishes_missing_from_unparsable() {
        assert_eq!(AmountValue::parse(None), AmountValue::Missing);
        assert_eq!(AmountValue::parse(Some("  ")), AmountValue::Missing);
        assert_eq!(AmountValue::parse(Some("abc")), AmountValue::Unparsable);
        assert_eq!(AmountValue::parse(Some("12.5")), AmountValue::Parsed(12.5));
        assert_eq!(AmountValue::parse(Some("abc")).or_zero(), 0.0);
    }

    #[test]
    fn round_trip_preserves_column_positions() {
        let tx = Transaction::from_cells(&[
            "t".into(),
            "2025-06-01".into(),
            "Cafe".into(),
            "12.5".into(),
            "USD".into(),
            "eating_out".into(),
            "".into(),
            "text".into(),
            "m1".into(),
        ]);
        let cells = tx.to_cells();
        assert_eq!(cells.len(), LEDGER_COLUMNS);
        assert_eq!(cells[3], "12.5");
        assert_eq!(cells[7], "text");
        assert_eq!(cells[8], "m1");
    }
}
