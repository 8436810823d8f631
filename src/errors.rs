use thiserror::Error;

/// Startup configuration problems. Fatal at cold start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Rejections raised while taking in a webhook delivery.
///
/// `InvalidSignature` never says *why* the signature did not match.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Failed to parse webhook payload: {0}")]
    MalformedPayload(String),

    #[error("Webhook payload is missing required field: {0}")]
    MissingField(&'static str),
}

impl IntakeError {
    /// HTTP status the webhook route answers with.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            IntakeError::InvalidSignature => 401,
            IntakeError::MalformedPayload(_) | IntakeError::MissingField(_) => 400,
        }
    }
}

/// Failures while reading pull request context from GitHub.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Pull request not found: {0}")]
    NotFound(String),

    #[error("GitHub rejected the credentials (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("GitHub rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("GitHub API unavailable (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to decode GitHub response: {0}")]
    Decode(String),

    #[error("Unexpected GitHub response (status {status}): {message}")]
    Unexpected { status: u16, message: String },
}

impl FetchError {
    /// Whether the retry policy may re-issue the request.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited(_) | FetchError::Upstream { .. } | FetchError::Http(_)
        )
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            FetchError::Decode(error.to_string())
        } else {
            FetchError::Http(error.to_string())
        }
    }
}

/// Text-generation failures. Never fatal to the dispatch flow.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Failed to access Groq API (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to send HTTP request: {0}")]
    Http(String),

    #[error("Failed to decode Groq response: {0}")]
    Decode(String),

    #[error("Groq returned an empty summary")]
    EmptyContent,
}

impl From<reqwest::Error> for SummaryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            SummaryError::Decode(error.to_string())
        } else {
            SummaryError::Http(error.to_string())
        }
    }
}

/// Chat delivery failures. Logged, never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Discord rejected the notification (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to send HTTP request: {0}")]
    Http(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(error: reqwest::Error) -> Self {
        NotifyError::Http(error.to_string())
    }
}
