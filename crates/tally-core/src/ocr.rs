//! OCR collaborators
//!
//! Receipt photos arrive as media URLs on the chat channel. The bytes are
//! fetched with the channel's credentials, then handed to an OCR backend
//! that returns plain text for the extraction LLM.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

#[async_trait]
pub trait OcrBackend: Send + Sync {
    /// Recognize text in a receipt image.
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// Fetch media bytes from the chat channel.
///
/// Twilio media URLs require the account credentials as basic auth.
pub async fn fetch_media_bytes(url: &str, account_sid: &str, auth_token: &str) -> Result<Vec<u8>> {
    let response = Client::new()
        .get(url)
        .basic_auth(account_sid, Some(auth_token))
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::Ocr(format!(
            "Media fetch failed: {}",
            response.status()
        )));
    }

    Ok(response.bytes().await?.to_vec())
}

/// OCR.Space backend
pub struct OcrSpaceBackend {
    http_client: Client,
    api_key: String,
}

impl OcrSpaceBackend {
    pub fn new(api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.to_string(),
        }
    }
}

/// Response from the OCR.Space parse endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceResponse {
    #[serde(default)]
    is_errored_on_processing: bool,
    error_message: Option<serde_json::Value>,
    #[serde(default)]
    parsed_results: Vec<OcrSpaceParsedResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OcrSpaceParsedResult {
    #[serde(default)]
    parsed_text: String,
}

#[async_trait]
impl OcrBackend for OcrSpaceBackend {
    async fn recognize(&self, image: &[u8]) -> Result<String> {
        let form = Form::new()
            .part(
                "file",
                Part::bytes(image.to_vec())
                    .file_name("receipt.jpg")
                    .mime_str("application/octet-stream")
                    .map_err(|e| Error::Ocr(format!("Invalid media part: {}", e)))?,
            )
            .text("language", "eng")
            .text("scale", "true")
            .text("isTable", "true");

        let response = self
            .http_client
            .post("https://api.ocr.space/parse/image")
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Ocr(format!(
                "OCR request failed: {}",
                response.status()
            )));
        }

        let body: OcrSpaceResponse = response.json().await?;
        if body.is_errored_on_processing {
            let message = body
                .error_message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "OCR.Space error".to_string());
            return Err(Error::Ocr(message));
        }

        let text = body
            .parsed_results
            .into_iter()
            .next()
            .map(|r| r.parsed_text)
            .unwrap_or_default();

        debug!(text_len = text.len(), "OCR text recognized");
        Ok(text.trim().to_string())
    }
}

/// Mock OCR backend for testing
#[derive(Default)]
pub struct MockOcr {
    text: Mutex<String>,
}

impl MockOcr {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
        }
    }
}

#[async_trait]
impl OcrBackend for MockOcr {
    async fn recognize(&self, _image: &[u8]) -> Result<String> {
        Ok(self.text.lock().expect("mock lock").clone())
    }
}
