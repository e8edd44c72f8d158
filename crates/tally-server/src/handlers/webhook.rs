//! Chat-channel ingestion webhook
//!
//! The channel posts one form per inbound message. Text messages go
//! straight to the extraction LLM; messages with media are OCR'd first and
//! the recognized text is appended to the caption. The reply is always the
//! channel's XML message envelope - extraction and append failures produce
//! an apologetic message rather than an HTTP error, so the channel never
//! retries blindly.

use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Form,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use tally_core::dates::local_today;
use tally_core::models::Source;
use tally_core::ocr::fetch_media_bytes;
use tally_core::{Error, ExpenseDraft};

/// Inbound message form (Twilio field names)
#[derive(Debug, Deserialize)]
pub struct WebhookForm {
    #[serde(rename = "Body")]
    pub body: Option<String>,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
    #[serde(rename = "NumMedia")]
    pub num_media: Option<String>,
    #[serde(rename = "MediaUrl0")]
    pub media_url0: Option<String>,
}

/// POST /webhook - Ingest one expense message
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    Form(form): Form<WebhookForm>,
) -> Response {
    let body = form.body.as_deref().unwrap_or("").trim().to_string();
    let message_sid = form.message_sid.as_deref().unwrap_or("").to_string();
    let num_media: usize = form
        .num_media
        .as_deref()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let source = if num_media > 0 { Source::Image } else { Source::Text };

    let draft = match extract_draft(&state, &body, source, form.media_url0.as_deref()).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, "Extraction failed");
            return twiml(&format!("LLM/OCR error: {}", e));
        }
    };

    let mut draft = draft;
    if draft.date.is_none() {
        draft.date = Some(local_today(&state.config.timezone).to_string());
    }

    let pretty = format!(
        "{} · {} · {} · {}",
        draft.name,
        pretty_amount(&draft),
        draft.category,
        draft.date.as_deref().unwrap_or("?")
    );

    let logged_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let tx = draft.into_transaction(logged_at, source, &message_sid);
    if let Err(e) = state.store.append_row(&tx).await {
        warn!(error = %e, "Ledger append failed");
        return twiml(&format!("Parsed but ledger append failed: {}\n({})", pretty, e));
    }

    info!(source = %source, "Logged expense");
    twiml(&format!("Logged: {}", pretty))
}

/// Run OCR (when the message carries media) and LLM extraction.
async fn extract_draft(
    state: &AppState,
    body: &str,
    source: Source,
    media_url: Option<&str>,
) -> tally_core::Result<ExpenseDraft> {
    let text = match source {
        Source::Text => body.to_string(),
        Source::Image => {
            let ocr_text = match media_url.filter(|u| !u.is_empty()) {
                Some(url) => {
                    let ocr = state
                        .ocr
                        .as_ref()
                        .ok_or(Error::MissingConfig("OCRSPACE_API_KEY"))?;
                    let sid = state
                        .config
                        .twilio_account_sid
                        .as_deref()
                        .ok_or(Error::MissingConfig("TWILIO_ACCOUNT_SID"))?;
                    let token = state
                        .config
                        .twilio_auth_token
                        .as_deref()
                        .ok_or(Error::MissingConfig("TWILIO_AUTH_TOKEN"))?;
                    let image = fetch_media_bytes(url, sid, token).await?;
                    ocr.recognize(&image).await?
                }
                None => String::new(),
            };
            let combined = if body.is_empty() {
                ocr_text
            } else {
                format!("{}\n{}", body, ocr_text)
            };
            let combined = combined.trim().to_string();
            if combined.is_empty() {
                "image receipt".to_string()
            } else {
                combined
            }
        }
    };

    state.llm.extract_expense(&text).await
}

fn pretty_amount(draft: &ExpenseDraft) -> String {
    match draft.amount {
        Some(amount) => format!("{} {}", draft.currency, amount),
        None => "Unknown amount".to_string(),
    }
}

/// Wrap a message in the channel's XML reply envelope.
fn twiml(message: &str) -> Response {
    let escaped = message
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escaped
    );
    ([("content-type", "application/xml")], xml).into_response()
}
