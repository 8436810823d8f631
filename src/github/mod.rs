//! GitHub pull request access

pub mod client;
pub mod pagination;

pub use client::GithubClient;
