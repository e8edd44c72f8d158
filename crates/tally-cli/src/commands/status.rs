//! Configuration status command

use anyhow::Result;

use tally_core::{Config, LedgerStore, SheetsStore};

pub async fn cmd_status() -> Result<()> {
    let config = Config::from_env();
    let flag = |set: bool| if set { "✅ configured" } else { "❌ not set" };

    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────");
    println!("   Timezone: {}", config.timezone);
    println!("   Groq model: {}", config.groq_model);
    println!();
    println!("   Ledger (SHEET_ID): {}", flag(config.sheet_id.is_some()));
    println!(
        "   Ledger token (SHEETS_TOKEN): {}",
        flag(config.sheets_token.is_some())
    );
    println!("   LLM (GROQ_API_KEY): {}", flag(config.groq_api_key.is_some()));
    println!(
        "   OCR (OCRSPACE_API_KEY): {}",
        flag(config.ocrspace_api_key.is_some())
    );
    println!(
        "   Push (TWILIO_*): {}",
        flag(config.twilio().is_ok())
    );
    println!(
        "   Cron token (TALLY_CRON_TOKEN): {}",
        flag(config.cron_token.is_some())
    );

    // When the ledger is configured, check it actually answers.
    if let (Ok(sheet_id), Ok(token)) = (config.sheet_id(), config.sheets_token()) {
        let store = SheetsStore::new(sheet_id, token);
        println!();
        match store.read_all_rows().await {
            Ok(rows) => println!("   📒 Ledger reachable: {} rows", rows.len()),
            Err(e) => println!("   ❌ Ledger read failed: {}", e),
        }
    }
    println!();

    Ok(())
}
