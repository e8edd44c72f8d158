//! Ledger store collaborators
//!
//! The ledger is a shared spreadsheet with one transaction per row. This
//! module defines the store seam plus two implementations: the Google
//! Sheets client used in production and an in-memory store for tests and
//! local development.

mod sheets;

pub use sheets::SheetsStore;

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::models::Transaction;

/// Read/append access to the transaction ledger.
///
/// Rows come back in storage order (append order, not sorted by date) with
/// the header row already stripped. Append failures surface to the caller;
/// nothing is retried or swallowed here.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn read_all_rows(&self) -> Result<Vec<Transaction>>;
    async fn append_row(&self, tx: &Transaction) -> Result<()>;
}

/// In-memory ledger for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Transaction>>,
    /// When set, every call fails; used to test failure propagation.
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Transaction>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("store lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn read_all_rows(&self) -> Result<Vec<Transaction>> {
        if self.fail {
            return Err(Error::Store("memory store set to fail".into()));
        }
        Ok(self.rows.lock().expect("store lock").clone())
    }

    async fn append_row(&self, tx: &Transaction) -> Result<()> {
        if self.fail {
            return Err(Error::Store("memory store set to fail".into()));
        }
        self.rows.lock().expect("store lock").push(tx.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips_rows() {
        let store = MemoryStore::new();
        let tx = Transaction::from_cells(&[
            "t".into(),
            "2025-06-01".into(),
            "Cafe".into(),
            "12.5".into(),
            "USD".into(),
            "eating_out".into(),
        ]);
        store.append_row(&tx).await.unwrap();
        let rows = store.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].merchant.as_deref(), Some("Cafe"));
    }

    #[tokio::test]
    async fn failing_store_surfaces_errors() {
        let store = MemoryStore::failing();
        assert!(store.read_all_rows().await.is_err());
        let tx = Transaction::default();
        assert!(store.append_row(&tx).await.is_err());
    }
}
