//! LLM collaborators
//!
//! Two narrow capabilities back the whole system: turning one chat message
//! into a structured expense draft, and turning a reporting context into a
//! short plain-text narrative. Both sit behind the `LlmBackend` seam so
//! tests and local development can swap in the mock.

mod groq;
pub mod parsing;

pub use groq::GroqBackend;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ExpenseDraft;

#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Extract a structured expense draft from free text.
    async fn extract_expense(&self, text: &str) -> Result<ExpenseDraft>;

    /// Render a reporting context (as JSON text) into narrative prose.
    /// Only invoked when the context has a nonzero count.
    async fn summarize(&self, context_json: &str) -> Result<String>;
}

/// Mock LLM backend for testing
///
/// Returns predictable values and counts invocations so tests can assert
/// the empty-ledger paths never reach the model.
#[derive(Default)]
pub struct MockLlm {
    pub summarize_calls: AtomicUsize,
    draft: Mutex<Option<ExpenseDraft>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the draft the next extraction returns.
    pub fn with_draft(draft: ExpenseDraft) -> Self {
        Self {
            summarize_calls: AtomicUsize::new(0),
            draft: Mutex::new(Some(draft)),
        }
    }

    pub fn summarize_count(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for MockLlm {
    async fn extract_expense(&self, text: &str) -> Result<ExpenseDraft> {
        if let Some(draft) = self.draft.lock().expect("mock lock").clone() {
            return Ok(draft);
        }
        Ok(ExpenseDraft {
            name: "Mock Merchant".to_string(),
            amount: Some(10.0),
            currency: "USD".to_string(),
            category: "other".to_string(),
            date: None,
            notes: text.to_string(),
        })
    }

    async fn summarize(&self, context_json: &str) -> Result<String> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("Summary of {} bytes of context.", context_json.len()))
    }
}
