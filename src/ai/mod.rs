//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

// Re-export main types for convenience
pub use client::{LlmClient, MAX_SUMMARY_CHARS};
pub use prompt_builder::estimate_tokens;
