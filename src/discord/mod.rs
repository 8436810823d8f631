//! All Discord-specific functionality

pub mod client;
pub mod message;

// Re-export main types for convenience
pub use client::DiscordNotifier;
pub use message::{Embed, EmbedField, EmbedFooter, NotificationBuilder, WebhookMessage};
