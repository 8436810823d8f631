//! Seams between the dispatcher and the three external services.
//!
//! Production wiring uses [`crate::github::GithubClient`],
//! [`crate::ai::LlmClient`] and [`crate::discord::DiscordNotifier`]; tests
//! swap in fakes.

use async_trait::async_trait;

use crate::core::models::{PullRequestContext, PullRequestRef, SummaryResult};
use crate::errors::{FetchError, NotifyError, SummaryError};

#[async_trait]
pub trait PullRequestSource: Send + Sync {
    async fn fetch_context(&self, target: &PullRequestRef)
    -> Result<PullRequestContext, FetchError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, context: &PullRequestContext) -> Result<SummaryResult, SummaryError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one notification. `summary` is `None` when summarization failed.
    async fn notify(
        &self,
        context: &PullRequestContext,
        summary: Option<&SummaryResult>,
        action: &str,
    ) -> Result<(), NotifyError>;
}
