//! Groq backend implementation
//!
//! HTTP client for Groq's OpenAI-compatible chat completions API. One
//! endpoint serves both capabilities: extraction runs in JSON mode at
//! temperature 0, summaries run as free text at a mild temperature.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ExpenseDraft;

use super::parsing::parse_expense_draft;
use super::LlmBackend;

const GROQ_API: &str = "https://api.groq.com/openai/v1/chat/completions";

const EXTRACT_SYSTEM_PROMPT: &str = "You are a strict JSON generator. Always respond with a single JSON object and nothing else.\n\
Task: extract expense data from a short message.\n\
Return a JSON object with keys:\n\
- name: merchant or person (string)\n\
- amount: number only, no currency symbol, null if missing\n\
- currency: 3-letter code, default USD if unclear\n\
- category: one of [rent, groceries, eating_out, utilities, transport, shopping, medical, entertainment, travel, education, transfer, other]\n\
- date: YYYY-MM-DD in the user's local timezone, omit if not present\n\
- notes: short summary\n\
Output must be valid JSON.";

const SUMMARY_SYSTEM_PROMPT: &str = "You are a helpful financial assistant. \
Write concise, chat-friendly text. No markdown links.";

pub struct GroqBackend {
    http_client: Client,
    api_key: String,
    model: String,
}

impl GroqBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .http_client
            .post(GROQ_API)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Llm(format!(
                "Groq request failed: {}",
                response.status()
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::Llm("Groq reply had no choices".into()))?;

        debug!(reply_len = content.len(), "Groq reply received");
        Ok(content)
    }
}

/// Request to the chat completions API
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl LlmBackend for GroqBackend {
    async fn extract_expense(&self, text: &str) -> Result<ExpenseDraft> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: EXTRACT_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Return JSON only. Input: {}", text.trim()),
                },
            ],
            temperature: 0.0,
            // JSON mode requires the word "json" in the messages, which the
            // system prompt provides.
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let reply = self.chat(&request).await?;
        parse_expense_draft(&reply, text)
    }

    async fn summarize(&self, context_json: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Return plain text (not JSON). Here is the expense data in JSON:\n\n{}\n\nNow write the summary and advice.",
                        context_json
                    ),
                },
            ],
            temperature: 0.4,
            response_format: None,
        };

        let reply = self.chat(&request).await?;
        Ok(reply.trim().to_string())
    }
}
