#![allow(dead_code)]

use httpmock::MockServer;
use prdigest::core::config::AppConfig;
use prdigest::core::models::{
    Comment, FileChange, FileStatus, PullRequestContext, Review, ReviewState,
};
use serde_json::{Value, json};

pub const SECRET: &str = "test-webhook-secret";

/// Config pointing every outbound API at one mock server.
pub fn config_for(server: &MockServer, secret: Option<&str>) -> AppConfig {
    config_with_timeout(server, secret, 5)
}

pub fn config_with_timeout(server: &MockServer, secret: Option<&str>, timeout_secs: u64) -> AppConfig {
    let timeout = timeout_secs.to_string();
    let github = server.base_url();
    let groq = server.url("/openai/v1");
    let discord = server.url("/discord/hook");
    let secret = secret.map(str::to_string);
    AppConfig::from_lookup(move |key| match key {
        "GITHUB_TOKEN" => Some("gh-token".to_string()),
        "GROQ_API_KEY" => Some("groq-key".to_string()),
        "DISCORD_WEBHOOK_URL" => Some(discord.clone()),
        "GITHUB_API_URL" => Some(github.clone()),
        "GROQ_API_URL" => Some(groq.clone()),
        "WEBHOOK_SECRET" => secret.clone(),
        "GITHUB_MAX_RETRIES" => Some("2".to_string()),
        "GITHUB_RETRY_BASE_MS" => Some("1".to_string()),
        "HTTP_TIMEOUT_SECS" => Some(timeout.clone()),
        _ => None,
    })
    .unwrap()
}

/// Config for tests that never leave the process.
pub fn offline_config(secret: Option<&str>) -> AppConfig {
    let secret = secret.map(str::to_string);
    AppConfig::from_lookup(move |key| match key {
        "GITHUB_TOKEN" => Some("gh-token".to_string()),
        "GROQ_API_KEY" => Some("groq-key".to_string()),
        "DISCORD_WEBHOOK_URL" => Some("https://discord.example/api/webhooks/1/abc".to_string()),
        "WEBHOOK_SECRET" => secret.clone(),
        _ => None,
    })
    .unwrap()
}

pub fn pull_request_body(action: &str) -> String {
    json!({
        "action": action,
        "number": 42,
        "pull_request": { "number": 42, "title": "Validate input" },
        "repository": { "name": "widgets", "owner": { "login": "acme" } }
    })
    .to_string()
}

pub fn github_pull_request() -> Value {
    json!({
        "number": 42,
        "title": "Validate form input",
        "body": "Adds validation to the signup form.",
        "state": "open",
        "merged": false,
        "user": { "login": "alice" },
        "head": { "ref": "feature/validate" },
        "base": { "ref": "main" },
        "additions": 40,
        "deletions": 6,
        "changed_files": 3,
        "html_url": "https://github.com/acme/widgets/pull/42",
        "created_at": "2026-10-01T10:00:00Z",
        "updated_at": "2026-10-02T12:30:00Z"
    })
}

pub fn github_files() -> Value {
    json!([
        { "filename": "src/form.rs", "status": "modified", "additions": 30, "deletions": 4 },
        { "filename": "src/validate.rs", "status": "added", "additions": 9, "deletions": 0 },
        { "filename": "Cargo.toml", "status": "modified", "additions": 1, "deletions": 2 }
    ])
}

pub fn sample_context() -> PullRequestContext {
    PullRequestContext {
        owner: "acme".into(),
        repo: "widgets".into(),
        number: 42,
        title: "Validate form input".into(),
        author: "alice".into(),
        description: "Adds validation to the signup form.".into(),
        state: "open".into(),
        merged: false,
        head_branch: "feature/validate".into(),
        base_branch: "main".into(),
        additions: 40,
        deletions: 6,
        changed_files: 3,
        url: "https://github.com/acme/widgets/pull/42".into(),
        created_at: None,
        updated_at: None,
        file_changes: vec![
            FileChange {
                path: "src/form.rs".into(),
                additions: 30,
                deletions: 4,
                status: FileStatus::Modified,
            },
            FileChange {
                path: "src/validate.rs".into(),
                additions: 9,
                deletions: 0,
                status: FileStatus::Added,
            },
            FileChange {
                path: "Cargo.toml".into(),
                additions: 1,
                deletions: 2,
                status: FileStatus::Modified,
            },
        ],
        comments: vec![
            Comment {
                author: "bob".into(),
                body: "Should the empty string be rejected as well?".into(),
                created_at: None,
                path: None,
                line: None,
            },
            Comment {
                author: "carol".into(),
                body: "This regex will not match unicode domains.".into(),
                created_at: None,
                path: Some("src/validate.rs".into()),
                line: Some(7),
            },
        ],
        reviews: vec![Review {
            author: "carol".into(),
            state: ReviewState::Approved,
            body: "Looks good to me".into(),
            submitted_at: None,
        }],
    }
}
