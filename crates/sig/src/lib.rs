//! SIG code standardization through an LLM

/// Environment configuration
pub mod config;

/// Chat-completions client
pub mod client;

/// Lambda event handler
pub mod handler;

/// Extraction prompt
pub mod prompt;

pub use client::{ChatModel, OpenAiClient};
pub use config::StandardizeConfig;
pub use handler::{parse_reply, StandardizeHandler};
