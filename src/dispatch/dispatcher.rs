//! Per-delivery pipeline: verify, classify, fetch, summarize, notify.

use std::fmt;
use std::sync::Arc;

use lambda_runtime::Error;
use tracing::{error, info, warn};

use crate::ai::LlmClient;
use crate::api::classify::{Classification, classify};
use crate::api::signature::verify_github_signature;
use crate::core::config::AppConfig;
use crate::core::models::{Delivery, InboundEvent, PullRequestRef, SummaryResult};
use crate::core::ports::{Notifier, PullRequestSource, Summarizer};
use crate::discord::DiscordNotifier;
use crate::errors::FetchError;
use crate::github::GithubClient;

/// Action label used when a run is started from the manual trigger.
pub const MANUAL_ACTION: &str = "manual_test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Received,
    Verified,
    Classified,
    ContextFetched,
    Summarized,
    Notified,
    Done,
    Rejected,
    SkippedNoop,
    FailedContext,
}

impl DispatchState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DispatchState::Done
                | DispatchState::Rejected
                | DispatchState::SkippedNoop
                | DispatchState::FailedContext
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DispatchState::Received => "received",
            DispatchState::Verified => "verified",
            DispatchState::Classified => "classified",
            DispatchState::ContextFetched => "context_fetched",
            DispatchState::Summarized => "summarized",
            DispatchState::Notified => "notified",
            DispatchState::Done => "done",
            DispatchState::Rejected => "rejected",
            DispatchState::SkippedNoop => "skipped_noop",
            DispatchState::FailedContext => "failed_context",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one delivery.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub trail: Vec<DispatchState>,
    /// Status the webhook route answers with.
    pub status_code: u16,
    pub summary: Option<SummaryResult>,
    pub notification_sent: bool,
    /// Why the run stopped early, for the response body.
    pub detail: Option<String>,
    pub fetch_error: Option<FetchError>,
}

impl DispatchOutcome {
    fn new(trail: Vec<DispatchState>) -> Self {
        Self {
            trail,
            status_code: 200,
            summary: None,
            notification_sent: false,
            detail: None,
            fetch_error: None,
        }
    }

    fn advance(&mut self, state: DispatchState) {
        self.trail.push(state);
    }

    fn finish(mut self, state: DispatchState, status_code: u16, detail: Option<String>) -> Self {
        self.trail.push(state);
        self.status_code = status_code;
        self.detail = detail;
        self
    }

    /// The last state reached.
    #[must_use]
    pub fn terminal(&self) -> DispatchState {
        self.trail.last().copied().unwrap_or(DispatchState::Received)
    }

    #[must_use]
    pub fn reached(&self, state: DispatchState) -> bool {
        self.trail.contains(&state)
    }
}

/// Runs deliveries through the pipeline. Shared read-only across invocations.
pub struct Dispatcher {
    config: Arc<AppConfig>,
    source: Arc<dyn PullRequestSource>,
    summarizer: Arc<dyn Summarizer>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn PullRequestSource>,
        summarizer: Arc<dyn Summarizer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            source,
            summarizer,
            notifier,
        }
    }

    /// Wires the production GitHub, Groq and Discord clients.
    ///
    /// # Errors
    ///
    /// Returns an error if any HTTP client cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, Error> {
        let source = GithubClient::new(&config)
            .map_err(|e| Error::from(format!("Failed to initialize GitHub client: {e}")))?;
        let summarizer = LlmClient::new(&config)
            .map_err(|e| Error::from(format!("Failed to initialize Groq client: {e}")))?;
        let notifier = DiscordNotifier::new(&config)
            .map_err(|e| Error::from(format!("Failed to initialize Discord notifier: {e}")))?;

        Ok(Self::new(
            Arc::new(config),
            Arc::new(source),
            Arc::new(summarizer),
            Arc::new(notifier),
        ))
    }

    /// Takes one webhook delivery from receipt to a terminal state.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(
            delivery_id = %delivery.delivery_id,
            event = delivery.event_type.as_deref().unwrap_or(""),
            pr = tracing::field::Empty,
        )
    )]
    pub async fn handle_delivery(&self, delivery: Delivery) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::new(vec![DispatchState::Received]);

        if !verify_github_signature(
            &delivery.raw_body,
            delivery.signature_header.as_deref(),
            self.config.webhook_secret.as_deref(),
        ) {
            warn!("Rejected delivery: invalid webhook signature");
            return outcome.finish(
                DispatchState::Rejected,
                401,
                Some("Invalid signature".to_string()),
            );
        }
        outcome.advance(DispatchState::Verified);

        let event = match InboundEvent::parse(delivery) {
            Ok(event) => event,
            Err(e) => {
                warn!("Rejected delivery: {}", e);
                return outcome.finish(DispatchState::Rejected, e.status_code(), Some(e.to_string()));
            }
        };

        let classification = classify(&event, &self.config.ignored_actions);
        outcome.advance(DispatchState::Classified);
        match classification {
            Classification::Reject => {
                info!(event_type = %event.event_type, "Ignoring unsupported event type");
                return outcome.finish(
                    DispatchState::Rejected,
                    200,
                    Some(format!("Event type '{}' is not handled", event.event_type)),
                );
            }
            Classification::Skip => {
                info!(action = %event.action, "Skipping ignored pull request action");
                return outcome.finish(
                    DispatchState::SkippedNoop,
                    200,
                    Some(format!("Action '{}' is ignored", event.action)),
                );
            }
            Classification::Process => {}
        }

        let target = match event.target() {
            Ok(target) => target,
            Err(e) => {
                warn!("Rejected delivery: {}", e);
                return outcome.finish(DispatchState::Rejected, e.status_code(), Some(e.to_string()));
            }
        };
        tracing::Span::current().record("pr", tracing::field::display(&target));
        info!(action = %event.action, "Processing pull request event");

        self.run_pipeline(outcome, &target, &event.action).await
    }

    /// Runs fetch, summarize and notify for a pull request named by hand,
    /// without signature or classification.
    #[tracing::instrument(level = "info", skip(self), fields(pr = %target))]
    pub async fn run_manual(&self, target: &PullRequestRef) -> DispatchOutcome {
        self.run_pipeline(DispatchOutcome::new(Vec::new()), target, MANUAL_ACTION)
            .await
    }

    async fn run_pipeline(
        &self,
        mut outcome: DispatchOutcome,
        target: &PullRequestRef,
        action: &str,
    ) -> DispatchOutcome {
        let context = match self.source.fetch_context(target).await {
            Ok(context) => context,
            Err(e) => {
                error!("Failed to fetch context for {}: {}", target, e);
                let detail = e.to_string();
                outcome.fetch_error = Some(e);
                return outcome.finish(DispatchState::FailedContext, 200, Some(detail));
            }
        };
        outcome.advance(DispatchState::ContextFetched);
        info!(
            files = context.file_changes.len(),
            comments = context.comments.len(),
            reviews = context.reviews.len(),
            "Fetched pull request context"
        );

        outcome.summary = match self.summarizer.summarize(&context).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!("Summary unavailable, sending notification without it: {}", e);
                None
            }
        };
        outcome.advance(DispatchState::Summarized);

        match self
            .notifier
            .notify(&context, outcome.summary.as_ref(), action)
            .await
        {
            Ok(()) => outcome.notification_sent = true,
            Err(e) => error!("Failed to deliver notification: {}", e),
        }
        outcome.advance(DispatchState::Notified);

        info!(
            notification_sent = outcome.notification_sent,
            has_summary = outcome.summary.is_some(),
            "Dispatch complete"
        );
        outcome.finish(DispatchState::Done, 200, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(DispatchState::Done.is_terminal());
        assert!(DispatchState::FailedContext.is_terminal());
        assert!(!DispatchState::Summarized.is_terminal());
        assert_eq!(DispatchState::SkippedNoop.to_string(), "skipped_noop");
    }

    #[test]
    fn test_outcome_tracks_trail() {
        let mut outcome = DispatchOutcome::new(vec![DispatchState::Received]);
        outcome.advance(DispatchState::Verified);
        let outcome = outcome.finish(DispatchState::Rejected, 400, Some("bad".to_string()));
        assert_eq!(outcome.terminal(), DispatchState::Rejected);
        assert!(outcome.reached(DispatchState::Verified));
        assert!(!outcome.reached(DispatchState::Classified));
        assert_eq!(outcome.status_code, 400);
    }
}
