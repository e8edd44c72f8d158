//! JSON parsing helpers for LLM responses
//!
//! Extraction runs in JSON mode, but model replies still arrive with the
//! occasional preamble or trailing prose, and field types wander (amounts
//! as strings, categories missing). These helpers pull the JSON object out
//! of the reply and normalize it into an `ExpenseDraft` with the documented
//! defaults.

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::ExpenseDraft;

/// Raw shape of the extraction reply before normalization
#[derive(Debug, Deserialize)]
struct RawDraft {
    name: Option<String>,
    amount: Option<serde_json::Value>,
    currency: Option<String>,
    category: Option<String>,
    date: Option<String>,
    notes: Option<String>,
}

/// Extract the JSON object embedded in an LLM reply.
pub fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::Llm(format!(
            "No JSON found in LLM response | Raw: {}",
            truncate_reply(response, 200)
        ))),
    }
}

/// Truncate a reply for error messages. Counts characters, not bytes, so
/// a cut never lands inside a multibyte sequence.
fn truncate_reply(reply: &str, max_chars: usize) -> String {
    if reply.chars().count() > max_chars {
        let head: String = reply.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        reply.to_string()
    }
}

/// Parse and normalize an extraction reply into a draft.
///
/// Defaults mirror what the ledger expects downstream: currency "USD",
/// category "other", name "Unknown", notes fall back to the input message.
/// A date that is not strict `YYYY-MM-DD` is dropped; the ingestion layer
/// substitutes the local "today" for a missing date.
pub fn parse_expense_draft(response: &str, original_text: &str) -> Result<ExpenseDraft> {
    let json_str = extract_json(response)?;
    let raw: RawDraft = serde_json::from_str(json_str)
        .map_err(|e| Error::Llm(format!("Invalid JSON from LLM: {}", e)))?;

    let amount = raw.amount.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    let strict_date = Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex");
    let date = raw
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| strict_date.is_match(d));

    Ok(ExpenseDraft {
        name: raw
            .name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        amount,
        currency: raw
            .currency
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "USD".to_string()),
        category: raw
            .category
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "other".to_string()),
        date,
        notes: raw
            .notes
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| original_text.trim().to_string()),
    })
}
