//! HTTP request handlers organized by domain

pub mod debug;
pub mod reports;
pub mod webhook;

// Re-export all handlers for use in router
pub use debug::*;
pub use reports::*;
pub use webhook::*;
