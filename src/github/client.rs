//! GitHub REST API client module
//!
//! Read-only access to pull requests with pagination and retry logic.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, LINK};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};
use url::Url;

use super::pagination::next_page_url;
use crate::core::config::{AppConfig, RetrySettings};
use crate::core::models::{
    Comment, FileChange, FileStatus, PullRequestContext, PullRequestRef, Review, ReviewState,
};
use crate::core::ports::PullRequestSource;
use crate::errors::FetchError;

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("prdigest/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: &str = "100";
/// GitHub stops listing pull request files after 3000 entries (30 pages of 100).
pub const MAX_PAGES: usize = 30;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);
const GHOST_USER: &str = "ghost";

#[derive(Debug, Deserialize)]
struct GhUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhPullRequest {
    title: String,
    body: Option<String>,
    state: String,
    merged: Option<bool>,
    user: Option<GhUser>,
    head: GhBranch,
    base: GhBranch,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
    #[serde(default)]
    changed_files: u64,
    #[serde(default)]
    html_url: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhFile {
    filename: String,
    status: FileStatus,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

#[derive(Debug, Deserialize)]
struct GhComment {
    user: Option<GhUser>,
    body: Option<String>,
    created_at: Option<DateTime<Utc>>,
    path: Option<String>,
    line: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct GhReview {
    user: Option<GhUser>,
    state: ReviewState,
    body: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

fn login(user: Option<GhUser>) -> String {
    user.map_or_else(|| GHOST_USER.to_string(), |u| u.login)
}

impl From<GhComment> for Comment {
    fn from(c: GhComment) -> Self {
        Comment {
            author: login(c.user),
            body: c.body.unwrap_or_default(),
            created_at: c.created_at,
            path: c.path,
            line: c.line,
        }
    }
}

/// Maps a non-success response onto the fetch error taxonomy.
#[must_use]
pub fn error_for_status(
    status: StatusCode,
    rate_limit_remaining: Option<&str>,
    body: String,
    resource: &str,
) -> FetchError {
    let code = status.as_u16();
    match status {
        StatusCode::NOT_FOUND => FetchError::NotFound(resource.to_string()),
        StatusCode::UNAUTHORIZED => FetchError::Unauthorized {
            status: code,
            message: body,
        },
        StatusCode::FORBIDDEN
            if rate_limit_remaining == Some("0")
                || body.to_ascii_lowercase().contains("rate limit") =>
        {
            FetchError::RateLimited(body)
        }
        StatusCode::FORBIDDEN => FetchError::Unauthorized {
            status: code,
            message: body,
        },
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited(body),
        s if s.is_server_error() => FetchError::Upstream {
            status: code,
            message: body,
        },
        _ => FetchError::Unexpected {
            status: code,
            message: body,
        },
    }
}

/// GitHub API client with retry logic and error handling
pub struct GithubClient {
    http: Client,
    base_url: Url,
    token: String,
    retry: RetrySettings,
}

impl GithubClient {
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.github_api_url)
            .map_err(|e| FetchError::Http(format!("Invalid GitHub API URL: {e}")))?;
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(format!("Failed to build GitHub HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            token: config.github_token.clone(),
            retry: config.retry,
        })
    }

    async fn with_retry<F, Fut, T>(&self, resource: &str, operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        RetryIf::start(retry_strategy(self.retry), operation, |e: &FetchError| {
            let transient = e.is_transient();
            if transient {
                warn!("Transient GitHub failure on {}: {}", resource, e);
            }
            transient
        })
        .await
    }

    fn endpoint(&self, segments: &[&str], paginated: bool) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::Http("GitHub API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        if paginated {
            url.query_pairs_mut()
                .append_pair("per_page", PER_PAGE)
                .append_pair("page", "1");
        }
        Ok(url)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        resource: &str,
    ) -> Result<(T, Option<String>), FetchError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let remaining = header_str(response.headers(), "x-ratelimit-remaining");
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
            return Err(error_for_status(status, remaining.as_deref(), body, resource));
        }

        let next = header_str(response.headers(), LINK.as_str())
            .as_deref()
            .and_then(next_page_url);
        let value = response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(format!("{resource}: {e}")))?;
        Ok((value, next))
    }

    async fn get_one<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<T, FetchError> {
        let url = self.endpoint(segments, false)?;
        let (value, _) = self
            .with_retry(resource, || self.get_page::<T>(url.as_str(), resource))
            .await?;
        Ok(value)
    }

    /// Follows `rel="next"` links until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<Vec<T>, FetchError> {
        let mut next = Some(self.endpoint(segments, true)?.to_string());
        let mut items = Vec::new();
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                warn!("Stopped listing {} after {} pages", resource, MAX_PAGES);
                break;
            }
            let (page, following) = self
                .with_retry(resource, || self.get_page::<Vec<T>>(&url, resource))
                .await?;
            pages += 1;
            if page.is_empty() {
                break;
            }
            items.extend(page);
            next = following;
        }

        Ok(items)
    }

    /// Auxiliary listings degrade to empty rather than failing the fetch.
    fn or_empty<T>(result: Result<Vec<T>, FetchError>, what: &str, target: &PullRequestRef) -> Vec<T> {
        result.unwrap_or_else(|e| {
            warn!("Could not fetch {} for {}: {}", what, target, e);
            Vec::new()
        })
    }
}

// Attempt n (1-based) waits roughly base * 2^n ms, jittered and capped.
fn retry_strategy(retry: RetrySettings) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(retry.base_delay_ms.max(1))
        .max_delay(MAX_RETRY_DELAY)
        .map(jitter)
        .take(retry.max_retries)
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

#[async_trait]
impl PullRequestSource for GithubClient {
    #[tracing::instrument(level = "info", skip(self, target), fields(pr = %target))]
    async fn fetch_context(
        &self,
        target: &PullRequestRef,
    ) -> Result<PullRequestContext, FetchError> {
        let owner = target.owner.as_str();
        let repo = target.repo.as_str();
        let number = target.number.to_string();
        let resource = target.to_string();

        info!("Fetching pull request details");
        let pr: GhPullRequest = self
            .get_one(&["repos", owner, repo, "pulls", &number], &resource)
            .await?;

        info!("Fetching changed files list");
        let files: Vec<GhFile> = self
            .get_all(&["repos", owner, repo, "pulls", &number, "files"], &resource)
            .await?;

        info!("Fetching review comments");
        let inline: Vec<GhComment> = Self::or_empty(
            self.get_all(&["repos", owner, repo, "pulls", &number, "comments"], &resource)
                .await,
            "review comments",
            target,
        );

        info!("Fetching discussion comments");
        let discussion: Vec<GhComment> = Self::or_empty(
            self.get_all(&["repos", owner, repo, "issues", &number, "comments"], &resource)
                .await,
            "discussion comments",
            target,
        );

        info!("Fetching reviews");
        let reviews: Vec<GhReview> = Self::or_empty(
            self.get_all(&["repos", owner, repo, "pulls", &number, "reviews"], &resource)
                .await,
            "reviews",
            target,
        );

        let mut comments: Vec<Comment> = inline.into_iter().map(Comment::from).collect();
        // Issue comments never carry a path, even if the payload has one.
        comments.extend(discussion.into_iter().map(|c| Comment {
            path: None,
            line: None,
            ..Comment::from(c)
        }));
        comments.sort_by_key(|c| c.created_at);

        info!(
            files = files.len(),
            comments = comments.len(),
            reviews = reviews.len(),
            "Assembled pull request context"
        );

        Ok(PullRequestContext {
            owner: target.owner.clone(),
            repo: target.repo.clone(),
            number: target.number,
            title: pr.title,
            author: login(pr.user),
            description: pr.body.unwrap_or_default(),
            state: pr.state,
            merged: pr.merged.unwrap_or(false),
            head_branch: pr.head.name,
            base_branch: pr.base.name,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
            url: pr.html_url,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            file_changes: files
                .into_iter()
                .map(|f| FileChange {
                    path: f.filename,
                    additions: f.additions,
                    deletions: f.deletions,
                    status: f.status,
                })
                .collect(),
            comments,
            reviews: reviews
                .into_iter()
                .map(|r| Review {
                    author: login(r.user),
                    state: r.state,
                    body: r.body.unwrap_or_default(),
                    submitted_at: r.submitted_at,
                })
                .collect(),
        })
    }
}
