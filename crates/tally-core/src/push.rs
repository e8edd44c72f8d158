//! Outbound push channel
//!
//! Reports are delivered back over the same chat channel the expenses
//! arrive on. Delivery failures propagate to the caller of the report
//! trigger; there is no retry or dedup here.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::TwilioConfig;
use crate::error::{Error, Result};

#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn send(&self, body: &str) -> Result<()>;
}

/// Twilio WhatsApp sender
pub struct TwilioWhatsApp {
    http_client: Client,
    config: TwilioConfig,
}

impl TwilioWhatsApp {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            http_client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl PushChannel for TwilioWhatsApp {
    async fn send(&self, body: &str) -> Result<()> {
        let url = format!(
            "https://api.twilio.com/2010-04-01/Accounts/{}/Messages.json",
            self.config.account_sid
        );

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("From", self.config.whatsapp_from.as_str()),
                ("To", self.config.whatsapp_to.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Push(format!(
                "Twilio send failed: {}",
                response.status()
            )));
        }

        debug!(body_len = body.len(), "Push message delivered");
        Ok(())
    }
}

/// Mock push channel that records delivered bodies
#[derive(Default)]
pub struct MockPush {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl MockPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl PushChannel for MockPush {
    async fn send(&self, body: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Push("mock push set to fail".into()));
        }
        self.sent.lock().expect("mock lock").push(body.to_string());
        Ok(())
    }
}
