//! Response builders shared by the API routes.

use serde_json::{Value, json};

use crate::dispatch::{DispatchOutcome, DispatchState};

/// Returns a 200 OK response with the given JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json!({ "statusCode": 200, "body": body.to_string() })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}

/// Returns the static liveness payload.
#[must_use]
pub fn health() -> Value {
    ok_json(&json!({
        "status": "healthy",
        "message": "GitHub PR summarizer is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Maps a webhook dispatch to its HTTP response.
#[must_use]
pub fn webhook_response(outcome: &DispatchOutcome, delivery_id: &str) -> Value {
    if outcome.status_code != 200 {
        let message = outcome.detail.as_deref().unwrap_or("Request rejected");
        return err_response(outcome.status_code, message);
    }

    let message = match outcome.terminal() {
        DispatchState::Done if outcome.notification_sent => "Notification sent",
        DispatchState::Done => "Processed; notification failed",
        DispatchState::SkippedNoop => "Action ignored",
        DispatchState::Rejected => "Event type not handled",
        DispatchState::FailedContext => "Event acknowledged; pull request context unavailable",
        _ => "Event acknowledged",
    };
    ok_json(&json!({
        "message": message,
        "state": outcome.terminal().as_str(),
        "delivery_id": delivery_id,
    }))
}

/// Maps a manual-trigger dispatch to its HTTP response.
#[must_use]
pub fn manual_response(outcome: &DispatchOutcome) -> Value {
    if let Some(err) = &outcome.fetch_error {
        let status = if err.is_not_found() { 404 } else { 502 };
        return err_response(status, &err.to_string());
    }

    let message = if outcome.notification_sent {
        "Test notification sent"
    } else {
        "Test run finished but the notification was not delivered"
    };
    ok_json(&json!({
        "message": message,
        "notification_sent": outcome.notification_sent,
        "summary": outcome.summary.as_ref().map(|s| s.text()),
    }))
}
