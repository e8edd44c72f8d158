//! Dry-run extraction command

use anyhow::Result;

use tally_core::{Config, GroqBackend, LlmBackend};

/// Run LLM extraction on one message and print the structured draft.
/// Nothing is appended to the ledger.
pub async fn cmd_extract(text: &str) -> Result<()> {
    let config = Config::from_env();
    let llm = GroqBackend::new(config.groq_api_key()?, &config.groq_model);

    println!("🔎 Extracting: {}", text);
    let draft = llm.extract_expense(text).await?;

    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}
