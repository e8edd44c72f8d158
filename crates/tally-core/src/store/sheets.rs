//! Google Sheets ledger store
//!
//! Thin client over the Sheets values API. The ledger lives in a single
//! tab named `transactions` with the fixed `A:I` column layout; the first
//! row is a header and is skipped on reads.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Transaction;

use super::LedgerStore;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// The tab and column range holding the ledger.
const LEDGER_RANGE: &str = "transactions!A:I";

pub struct SheetsStore {
    http_client: Client,
    sheet_id: String,
    token: String,
}

impl SheetsStore {
    pub fn new(sheet_id: &str, token: &str) -> Self {
        Self {
            http_client: Client::new(),
            sheet_id: sheet_id.to_string(),
            token: token.to_string(),
        }
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/{}/values/{}{}",
            SHEETS_API, self.sheet_id, LEDGER_RANGE, suffix
        )
    }
}

/// Response from the values GET endpoint
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Body for the values append endpoint
#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

#[async_trait]
impl LedgerStore for SheetsStore {
    async fn read_all_rows(&self) -> Result<Vec<Transaction>> {
        let response = self
            .http_client
            .get(self.values_url(""))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Sheets read failed: {}",
                response.status()
            )));
        }

        let body: ValuesResponse = response.json().await?;
        debug!(rows = body.values.len(), "Read ledger rows");

        // First row is the header.
        Ok(body
            .values
            .into_iter()
            .skip(1)
            .map(|cells| Transaction::from_cells(&cells))
            .collect())
    }

    async fn append_row(&self, tx: &Transaction) -> Result<()> {
        let request = AppendRequest {
            values: vec![tx.to_cells()],
        };

        let response = self
            .http_client
            .post(self.values_url(":append?valueInputOption=USER_ENTERED"))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Store(format!(
                "Sheets append failed: {}",
                response.status()
            )));
        }

        debug!(merchant = ?tx.merchant, "Appended ledger row");
        Ok(())
    }
}
