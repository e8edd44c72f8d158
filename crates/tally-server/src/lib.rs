//! Tally Web Server
//!
//! Axum HTTP surface for the Tally expense ledger bot:
//! - `POST /webhook`: chat-channel ingestion (text or photographed receipt)
//! - `GET /reports/:kind`: rendered report preview (day, week, month)
//! - `POST /reports/:kind/send`: render and push, guarded by a cron token
//! - `GET /health`, `GET /debug/rows`: liveness and ledger introspection
//!
//! Report computation is request-scoped and pure: each request reads the
//! whole ledger once, then everything happens in process. Concurrent
//! requests are independent; nothing here mutates stored rows.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tally_core::{
    Config, GroqBackend, LedgerStore, LlmBackend, OcrBackend, OcrSpaceBackend, PushChannel,
    SheetsStore, TwilioWhatsApp,
};

mod handlers;
mod scheduler;

pub use handlers::reports::{render_report, RenderedReport};
pub use scheduler::{start_report_scheduler, ReportScheduleConfig};

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub llm: Arc<dyn LlmBackend>,
    /// OCR backend for receipt photos; image messages fail politely when
    /// it is not configured.
    pub ocr: Option<Arc<dyn OcrBackend>>,
    /// Outbound push channel; preview routes work without it.
    pub push: Option<Arc<dyn PushChannel>>,
    pub config: Config,
}

impl AppState {
    /// Build application state with real collaborators from configuration.
    ///
    /// The ledger store and the LLM are required; OCR and push are wired
    /// only when their credentials are present.
    pub fn from_config(config: Config) -> tally_core::Result<Self> {
        let store: Arc<dyn LedgerStore> =
            Arc::new(SheetsStore::new(config.sheet_id()?, config.sheets_token()?));
        let llm: Arc<dyn LlmBackend> =
            Arc::new(GroqBackend::new(config.groq_api_key()?, &config.groq_model));

        let ocr: Option<Arc<dyn OcrBackend>> = match config.ocrspace_api_key.as_deref() {
            Some(key) => Some(Arc::new(OcrSpaceBackend::new(key))),
            None => {
                info!("ℹ️  OCR backend not configured (set OCRSPACE_API_KEY to ingest receipts)");
                None
            }
        };

        let push: Option<Arc<dyn PushChannel>> = match config.twilio() {
            Ok(twilio) => Some(Arc::new(TwilioWhatsApp::new(twilio))),
            Err(_) => {
                info!("ℹ️  Push channel not configured (set TWILIO_* to deliver reports)");
                None
            }
        };

        Ok(Self {
            store,
            llm,
            ocr,
            push,
            config,
        })
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handlers::webhook))
        .route("/reports/:kind", get(handlers::preview_report))
        .route("/reports/:kind/send", post(handlers::send_report))
        .route("/health", get(handlers::health))
        .route("/debug/rows", get(handlers::debug_rows))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    if state.config.cron_token.is_none() {
        warn!("⚠️  TALLY_CRON_TOKEN not set - report send routes are unguarded");
    }

    if let Some(schedule) = ReportScheduleConfig::from_env() {
        start_report_scheduler(state.clone(), schedule);
    }

    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
