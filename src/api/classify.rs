//! Decides what to do with a verified webhook event.

use crate::core::models::{InboundEvent, PULL_REQUEST_EVENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Fetch context, summarize and notify.
    Process,
    /// A pull request action nobody wants to hear about.
    Skip,
    /// Not a pull request event. Acknowledged, never processed.
    Reject,
}

#[must_use]
pub fn classify(event: &InboundEvent, ignored_actions: &[String]) -> Classification {
    if event.event_type != PULL_REQUEST_EVENT {
        return Classification::Reject;
    }
    if ignored_actions.iter().any(|a| *a == event.action) {
        return Classification::Skip;
    }
    Classification::Process
}
