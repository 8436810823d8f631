/// prdigest - posts AI summaries of GitHub pull requests to Discord.
///
/// This crate implements a single API Lambda that:
/// 1. Receives GitHub `pull_request` webhooks and verifies their signature
/// 2. Fetches the pull request, its files, comments and reviews from GitHub
/// 3. Summarizes the pull request with a Groq-hosted model
/// 4. Posts one embed message to a Discord webhook
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for serverless execution
/// - reqwest for the GitHub, Groq and Discord HTTP APIs
/// - openai-api-rs message types for the Groq chat-completions request
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use prdigest::core::config::AppConfig;
/// use prdigest::core::models::PullRequestRef;
/// use prdigest::dispatch::Dispatcher;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///     prdigest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let dispatcher = Dispatcher::from_config(config)?;
///
///     let target = PullRequestRef {
///         owner: "acme".to_string(),
///         repo: "widgets".to_string(),
///         number: 42,
///     };
///     let outcome = dispatcher.run_manual(&target).await;
///     println!("notification sent: {}", outcome.notification_sent);
///     Ok(())
/// }
/// ```
// Module declarations
pub mod ai;
pub mod api;
pub mod core;
pub mod discord;
pub mod dispatch;
pub mod errors;
pub mod github;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The level defaults to `info` and can be overridden with `RUST_LOG`.
/// Calling it more than once is harmless; later calls leave the first
/// subscriber in place.
///
/// # Example
///
/// ```
/// prdigest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
