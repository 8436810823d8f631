//! API Lambda: HTTP routing, webhook intake and verification

pub mod classify;
pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;

pub use handler::{function_handler, route};
