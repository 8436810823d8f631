use std::env;
use std::time::Duration;

use url::Url;

use crate::errors::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Pull request actions that never produce a notification.
pub const DEFAULT_IGNORED_ACTIONS: &[&str] = &[
    "assigned",
    "unassigned",
    "labeled",
    "unlabeled",
    "review_requested",
    "review_request_removed",
];

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: usize = 3;
const DEFAULT_RETRY_BASE_MS: u64 = 200;

/// Backoff settings for transient GitHub failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_RETRY_BASE_MS,
        }
    }
}

/// Process-wide configuration, read once at cold start and shared read-only.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_token: String,
    pub github_api_url: String,
    pub groq_api_key: String,
    pub groq_api_url: String,
    pub groq_model: String,
    pub discord_webhook_url: String,
    pub discord_user_id: Option<String>,
    pub webhook_secret: Option<String>,
    pub ignored_actions: Vec<String>,
    pub http_timeout: Duration,
    pub retry: RetrySettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| non_empty(key).ok_or(ConfigError::Missing(key));

        let discord_webhook_url = required("DISCORD_WEBHOOK_URL")?;
        Url::parse(&discord_webhook_url).map_err(|e| ConfigError::Invalid {
            key: "DISCORD_WEBHOOK_URL",
            message: e.to_string(),
        })?;

        let ignored_actions = match non_empty("IGNORED_PR_ACTIONS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_IGNORED_ACTIONS
                .iter()
                .map(|a| (*a).to_string())
                .collect(),
        };

        let http_timeout_secs = parse_or(
            "HTTP_TIMEOUT_SECS",
            non_empty("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "HTTP_TIMEOUT_SECS",
                message: "timeout must be at least one second".to_string(),
            });
        }

        Ok(Self {
            github_token: required("GITHUB_TOKEN")?,
            github_api_url: trim_base(
                non_empty("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            ),
            groq_api_key: required("GROQ_API_KEY")?,
            groq_api_url: trim_base(
                non_empty("GROQ_API_URL").unwrap_or_else(|| DEFAULT_GROQ_API_URL.to_string()),
            ),
            groq_model: non_empty("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            discord_webhook_url,
            discord_user_id: non_empty("DISCORD_USER_ID"),
            webhook_secret: non_empty("WEBHOOK_SECRET"),
            ignored_actions,
            http_timeout: Duration::from_secs(http_timeout_secs),
            retry: RetrySettings {
                max_retries: parse_or(
                    "GITHUB_MAX_RETRIES",
                    non_empty("GITHUB_MAX_RETRIES"),
                    DEFAULT_MAX_RETRIES,
                )?,
                base_delay_ms: parse_or(
                    "GITHUB_RETRY_BASE_MS",
                    non_empty("GITHUB_RETRY_BASE_MS"),
                    DEFAULT_RETRY_BASE_MS,
                )?,
            },
        })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(v) => v.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
