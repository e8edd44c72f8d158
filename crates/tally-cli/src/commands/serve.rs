//! Server command implementation

use std::sync::Arc;

use anyhow::Result;

use tally_core::Config;
use tally_server::AppState;

pub async fn cmd_serve(host: &str, port: u16) -> Result<()> {
    let config = Config::from_env();

    println!("🚀 Starting Tally web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!("   Timezone: {}", config.timezone);
    if config.cron_token.is_some() {
        println!("   🔒 Report sends: guarded (TALLY_CRON_TOKEN)");
    } else {
        println!("   ⚠️  Report sends: unguarded (set TALLY_CRON_TOKEN)");
    }

    let state = Arc::new(AppState::from_config(config)?);
    tally_server::serve(state, host, port).await
}
