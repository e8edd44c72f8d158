//! Tally Core Library
//!
//! Shared functionality for the Tally expense ledger bot:
//! - Date normalization for the ledger's mixed cell encodings
//! - Row date resolution with time-zone-aware timestamp fallback
//! - Report windows (trailing days, calendar week/month) with
//!   previous-period comparison
//! - One-pass aggregation and reporting contexts
//! - Collaborator seams: ledger store, extraction/summary LLM, OCR,
//!   and the outbound push channel

pub mod aggregate;
pub mod ai;
pub mod config;
pub mod context;
pub mod dates;
pub mod error;
pub mod models;
pub mod ocr;
pub mod push;
pub mod store;
pub mod window;

pub use aggregate::{aggregate, Aggregate, OrderedSums};
pub use ai::{GroqBackend, LlmBackend, MockLlm};
pub use config::{Config, TwilioConfig};
pub use context::{build_daily_context, build_window_context, DailyContext, WindowContext};
pub use dates::{local_today, normalize_cell_date, resolve_row_date};
pub use error::{Error, Result};
pub use models::{AmountValue, ExpenseDraft, Source, Transaction};
pub use ocr::{MockOcr, OcrBackend, OcrSpaceBackend};
pub use push::{MockPush, PushChannel, TwilioWhatsApp};
pub use store::{LedgerStore, MemoryStore, SheetsStore};
pub use window::{Window, WindowKind};
