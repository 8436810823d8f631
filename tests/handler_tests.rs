mod common;

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use prdigest::api::route;
use prdigest::api::signature::compute_signature;
use prdigest::core::models::{PullRequestContext, PullRequestRef, SummaryResult};
use prdigest::core::ports::{Notifier, PullRequestSource, Summarizer};
use prdigest::dispatch::Dispatcher;
use prdigest::errors::{FetchError, NotifyError, SummaryError};
use serde_json::{Value, json};

struct StubSource;

#[async_trait]
impl PullRequestSource for StubSource {
    async fn fetch_context(
        &self,
        target: &PullRequestRef,
    ) -> Result<PullRequestContext, FetchError> {
        match target.number {
            42 => Ok(common::sample_context()),
            500 => Err(FetchError::Upstream {
                status: 503,
                message: "unavailable".to_string(),
            }),
            _ => Err(FetchError::NotFound(target.to_string())),
        }
    }
}

struct StubSummarizer;

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize(&self, _context: &PullRequestContext) -> Result<SummaryResult, SummaryError> {
        SummaryResult::bounded("Adds input validation.", 1_900)
    }
}

struct StubNotifier;

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify(
        &self,
        _context: &PullRequestContext,
        _summary: Option<&SummaryResult>,
        _action: &str,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(common::offline_config(Some(common::SECRET))),
        Arc::new(StubSource),
        Arc::new(StubSummarizer),
        Arc::new(StubNotifier),
    )
}

fn request(method: &str, path: &str, headers: Value, body: &str) -> Value {
    json!({
        "rawPath": path,
        "requestContext": { "http": { "method": method } },
        "headers": headers,
        "body": body,
        "isBase64Encoded": false
    })
}

fn webhook(body: &str, event: &str, signature: Option<String>) -> Value {
    let mut headers = json!({
        "x-github-event": event,
        "x-github-delivery": "abc-123",
        "content-type": "application/json"
    });
    if let Some(sig) = signature {
        headers["x-hub-signature-256"] = Value::String(sig);
    }
    request("POST", "/webhook", headers, body)
}

fn status(response: &Value) -> u64 {
    response["statusCode"].as_u64().unwrap()
}

fn body(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = route(&dispatcher(), &request("GET", "/health", json!({}), "")).await;
    assert_eq!(status(&response), 200);
    assert_eq!(body(&response)["status"], "healthy");

    let root = route(&dispatcher(), &json!({ "path": "/", "httpMethod": "GET" })).await;
    assert_eq!(status(&root), 200);
}

#[tokio::test]
async fn test_unknown_path_and_wrong_method() {
    let missing = route(&dispatcher(), &request("GET", "/admin", json!({}), "")).await;
    assert_eq!(status(&missing), 404);
    assert_eq!(body(&missing)["error"], "Endpoint not found");

    let wrong = route(&dispatcher(), &request("GET", "/webhook", json!({}), "")).await;
    assert_eq!(status(&wrong), 405);
}

#[tokio::test]
async fn test_webhook_processed() {
    let payload = common::pull_request_body("opened");
    let sig = compute_signature(payload.as_bytes(), common::SECRET);

    let response = route(&dispatcher(), &webhook(&payload, "pull_request", Some(sig))).await;

    assert_eq!(status(&response), 200);
    let body = body(&response);
    assert_eq!(body["state"], "done");
    assert_eq!(body["delivery_id"], "abc-123");
}

#[tokio::test]
async fn test_webhook_bad_signature_is_401() {
    let payload = common::pull_request_body("opened");
    let response = route(
        &dispatcher(),
        &webhook(&payload, "pull_request", Some("sha256=deadbeef".to_string())),
    )
    .await;
    assert_eq!(status(&response), 401);
}

#[tokio::test]
async fn test_webhook_malformed_body_is_400() {
    let payload = "{\"action\": ";
    let sig = compute_signature(payload.as_bytes(), common::SECRET);
    let response = route(&dispatcher(), &webhook(payload, "pull_request", Some(sig))).await;
    assert_eq!(status(&response), 400);
}

#[tokio::test]
async fn test_webhook_unsupported_and_ignored_are_200() {
    let payload = r#"{"zen":"Keep it logically awesome."}"#;
    let sig = compute_signature(payload.as_bytes(), common::SECRET);
    let response = route(&dispatcher(), &webhook(payload, "ping", Some(sig))).await;
    assert_eq!(status(&response), 200);
    assert_eq!(body(&response)["state"], "rejected");

    let payload = common::pull_request_body("assigned");
    let sig = compute_signature(payload.as_bytes(), common::SECRET);
    let response = route(&dispatcher(), &webhook(&payload, "pull_request", Some(sig))).await;
    assert_eq!(status(&response), 200);
    assert_eq!(body(&response)["state"], "skipped_noop");
}

#[tokio::test]
async fn test_webhook_base64_body_verified_on_wire_bytes() {
    let payload = common::pull_request_body("opened");
    let sig = compute_signature(payload.as_bytes(), common::SECRET);
    let mut event = webhook("", "pull_request", Some(sig));
    event["body"] = Value::String(STANDARD.encode(payload.as_bytes()));
    event["isBase64Encoded"] = Value::Bool(true);

    let response = route(&dispatcher(), &event).await;
    assert_eq!(status(&response), 200);
}

#[tokio::test]
async fn test_webhook_without_delivery_header_gets_generated_id() {
    let payload = common::pull_request_body("opened");
    let sig = compute_signature(payload.as_bytes(), common::SECRET);
    let mut event = webhook(&payload, "pull_request", Some(sig));
    event["headers"]
        .as_object_mut()
        .unwrap()
        .remove("x-github-delivery");

    let response = route(&dispatcher(), &event).await;
    let id = body(&response)["delivery_id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_manual_trigger() {
    let ok = route(
        &dispatcher(),
        &request(
            "POST",
            "/test",
            json!({}),
            r#"{"owner":"acme","repo":"widgets","pr_number":42}"#,
        ),
    )
    .await;
    assert_eq!(status(&ok), 200);
    let ok_body = body(&ok);
    assert_eq!(ok_body["notification_sent"], true);
    assert_eq!(ok_body["summary"], "Adds input validation.");

    let missing = route(
        &dispatcher(),
        &request("POST", "/test", json!({}), r#"{"owner":"acme","repo":"widgets","pr_number":7}"#),
    )
    .await;
    assert_eq!(status(&missing), 404);

    let upstream = route(
        &dispatcher(),
        &request("POST", "/test", json!({}), r#"{"owner":"acme","repo":"widgets","pr_number":500}"#),
    )
    .await;
    assert_eq!(status(&upstream), 502);

    let incomplete = route(
        &dispatcher(),
        &request("POST", "/test", json!({}), r#"{"owner":"acme"}"#),
    )
    .await;
    assert_eq!(status(&incomplete), 400);

    let garbage = route(&dispatcher(), &request("POST", "/test", json!({}), "nope")).await;
    assert_eq!(status(&garbage), 400);
}
