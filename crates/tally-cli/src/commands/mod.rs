//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `extract` - Dry-run LLM extraction of one message
//! - `report` - Report rendering and pushing
//! - `serve` - Web server command
//! - `status` - Configuration status

pub mod extract;
pub mod report;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use extract::*;
pub use report::*;
pub use serve::*;
pub use status::*;
