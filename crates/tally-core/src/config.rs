//! Runtime configuration
//!
//! All deployment knobs come from the environment and are resolved once at
//! startup into a `Config` value that is passed down explicitly. Credential
//! fields stay `Option` so the parts of the system that do not need a given
//! collaborator can run without its secrets; constructors for the real
//! clients return `Error::MissingConfig` when theirs is absent.

use crate::error::{Error, Result};

/// Default IANA zone for the ledger's calendar arithmetic.
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

/// Default Groq model for extraction and summaries.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug, Clone)]
pub struct Config {
    /// IANA zone name every canonical date is expressed in.
    pub timezone: String,
    /// Spreadsheet holding the transaction ledger.
    pub sheet_id: Option<String>,
    /// OAuth bearer token for the Sheets API.
    pub sheets_token: Option<String>,
    /// Groq API key for extraction and narrative summaries.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    /// OCR.Space API key for receipt photos.
    pub ocrspace_api_key: Option<String>,
    /// Twilio credentials and WhatsApp endpoints for outbound pushes
    /// (and for fetching inbound media).
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_whatsapp_from: Option<String>,
    pub twilio_whatsapp_to: Option<String>,
    /// Shared token guarding the push-triggering report routes.
    pub cron_token: Option<String>,
}

impl Config {
    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            timezone: var("TALLY_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            sheet_id: var("SHEET_ID"),
            sheets_token: var("SHEETS_TOKEN"),
            groq_api_key: var("GROQ_API_KEY"),
            groq_model: var("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            ocrspace_api_key: var("OCRSPACE_API_KEY"),
            twilio_account_sid: var("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: var("TWILIO_AUTH_TOKEN"),
            twilio_whatsapp_from: var("TWILIO_WHATSAPP_FROM"),
            twilio_whatsapp_to: var("TWILIO_WHATSAPP_TO"),
            cron_token: var("TALLY_CRON_TOKEN"),
        }
    }

    pub fn sheet_id(&self) -> Result<&str> {
        self.sheet_id.as_deref().ok_or(Error::MissingConfig("SHEET_ID"))
    }

    pub fn sheets_token(&self) -> Result<&str> {
        self.sheets_token
            .as_deref()
            .ok_or(Error::MissingConfig("SHEETS_TOKEN"))
    }

    pub fn groq_api_key(&self) -> Result<&str> {
        self.groq_api_key
            .as_deref()
            .ok_or(Error::MissingConfig("GROQ_API_KEY"))
    }

    pub fn ocrspace_api_key(&self) -> Result<&str> {
        self.ocrspace_api_key
            .as_deref()
            .ok_or(Error::MissingConfig("OCRSPACE_API_KEY"))
    }

    pub fn twilio(&self) -> Result<TwilioConfig> {
        Ok(TwilioConfig {
            account_sid: self
                .twilio_account_sid
                .clone()
                .ok_or(Error::MissingConfig("TWILIO_ACCOUNT_SID"))?,
            auth_token: self
                .twilio_auth_token
                .clone()
                .ok_or(Error::MissingConfig("TWILIO_AUTH_TOKEN"))?,
            whatsapp_from: self
                .twilio_whatsapp_from
                .clone()
                .ok_or(Error::MissingConfig("TWILIO_WHATSAPP_FROM"))?,
            whatsapp_to: self
                .twilio_whatsapp_to
                .clone()
                .ok_or(Error::MissingConfig("TWILIO_WHATSAPP_TO"))?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            sheet_id: None,
            sheets_token: None,
            groq_api_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            ocrspace_api_key: None,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_whatsapp_from: None,
            twilio_whatsapp_to: None,
            cron_token: None,
        }
    }
}

/// Twilio credentials plus the WhatsApp endpoints, all required together.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub whatsapp_from: String,
    pub whatsapp_to: String,
}
