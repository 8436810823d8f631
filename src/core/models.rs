use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::{IntakeError, SummaryError};

/// The only GitHub event type the relay acts on.
pub const PULL_REQUEST_EVENT: &str = "pull_request";

/// A webhook delivery exactly as it arrived, before anything is parsed.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event_type: Option<String>,
    pub delivery_id: String,
    pub signature_header: Option<String>,
    pub raw_body: Vec<u8>,
}

/// The fields of a GitHub webhook body the relay reads. Everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub pull_request: Option<PayloadPullRequest>,
    #[serde(default)]
    pub repository: Option<PayloadRepository>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadPullRequest {
    pub number: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadRepository {
    pub name: Option<String>,
    pub owner: Option<PayloadOwner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayloadOwner {
    pub login: Option<String>,
}

/// A delivery whose body has been parsed. Immutable for the rest of the request.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_type: String,
    pub action: String,
    pub delivery_id: String,
    pub raw_body: Vec<u8>,
    pub signature_header: Option<String>,
    payload: WebhookPayload,
}

impl InboundEvent {
    /// Parses the raw body of a delivery.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MalformedPayload`] when the body is not a JSON object.
    pub fn parse(delivery: Delivery) -> Result<Self, IntakeError> {
        let payload: WebhookPayload = serde_json::from_slice(&delivery.raw_body)
            .map_err(|e| IntakeError::MalformedPayload(e.to_string()))?;

        Ok(Self {
            event_type: delivery.event_type.unwrap_or_default(),
            action: payload.action.clone().unwrap_or_default(),
            delivery_id: delivery.delivery_id,
            raw_body: delivery.raw_body,
            signature_header: delivery.signature_header,
            payload,
        })
    }

    /// The pull request this event refers to.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::MissingField`] naming the first absent field.
    pub fn target(&self) -> Result<PullRequestRef, IntakeError> {
        let repository = self
            .payload
            .repository
            .as_ref()
            .ok_or(IntakeError::MissingField("repository"))?;
        let owner = repository
            .owner
            .as_ref()
            .and_then(|o| o.login.clone())
            .filter(|s| !s.is_empty())
            .ok_or(IntakeError::MissingField("repository.owner.login"))?;
        let repo = repository
            .name
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or(IntakeError::MissingField("repository.name"))?;
        let number = self
            .payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.number)
            .ok_or(IntakeError::MissingField("pull_request.number"))?;

        Ok(PullRequestRef {
            owner,
            repo,
            number,
        })
    }
}

/// Identifies a pull request on GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Body of the manual trigger route. Fields are optional so the route can
/// report which ones are missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualTrigger {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub pr_number: Option<u64>,
}

impl ManualTrigger {
    #[must_use]
    pub fn into_target(self) -> Option<PullRequestRef> {
        match (self.owner, self.repo, self.pr_number) {
            (Some(owner), Some(repo), Some(number)) if !owner.is_empty() && !repo.is_empty() => {
                Some(PullRequestRef {
                    owner,
                    repo,
                    number,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
    pub status: FileStatus,
}

impl FileChange {
    #[must_use]
    pub fn churn(&self) -> u64 {
        self.additions + self.deletions
    }
}

/// A pull request comment. Inline review comments carry the file they target;
/// discussion comments have no path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub line: Option<u64>,
}

impl Comment {
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.path.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
    #[serde(other)]
    Other,
}

impl ReviewState {
    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            ReviewState::Approved => "✅",
            ReviewState::ChangesRequested => "❌",
            ReviewState::Commented => "💭",
            _ => "📝",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review {
    pub author: String,
    pub state: ReviewState,
    pub body: String,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Everything the relay knows about one pull request. Built once per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub state: String,
    pub merged: bool,
    pub head_branch: String,
    pub base_branch: String,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub file_changes: Vec<FileChange>,
    pub comments: Vec<Comment>,
    pub reviews: Vec<Review>,
}

impl PullRequestContext {
    pub fn inline_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| c.is_inline())
    }

    pub fn discussion_comments(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.is_inline())
    }
}

/// A summary ready for the chat channel, never longer than its bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    text: String,
}

impl SummaryResult {
    /// Trims model output and bounds it to `max_chars` characters.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::EmptyContent`] when nothing but whitespace is left.
    pub fn bounded(raw: &str, max_chars: usize) -> Result<Self, SummaryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SummaryError::EmptyContent);
        }
        Ok(Self {
            text: truncate_chars(trimmed, max_chars),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Truncates on a char boundary, marking the cut with an ellipsis that counts
/// towards the limit.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}
