//! Configuration, domain types and service seams

pub mod config;
pub mod models;
pub mod ports;
