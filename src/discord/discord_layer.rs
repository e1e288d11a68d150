// Discord layer - slash commands and the audit channel forwarder.

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "audit/audit_dispatcher.rs"]
pub mod audit;

#[path = "embed_text.rs"]
pub mod embed_text;

// Re-export command types for convenience
pub use commands::registry::{Data, Error};
