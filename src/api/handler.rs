//! API Lambda handler - thin router over the dispatcher.
//!
//! This module handles:
//! - Health checks
//! - GitHub webhook intake (delegated to the dispatcher)
//! - The manual trigger used to test a deployment end to end

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{helpers, parsing};
use crate::core::models::{Delivery, ManualTrigger};
use crate::dispatch::Dispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Webhook,
    ManualTrigger,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() || path.ends_with("/health") {
            Some(Route::Health)
        } else if path.ends_with("/webhook") {
            Some(Route::Webhook)
        } else if path.ends_with("/test") {
            Some(Route::ManualTrigger)
        } else {
            None
        }
    }

    fn method(self) -> &'static str {
        match self {
            Route::Health => "GET",
            Route::Webhook | Route::ManualTrigger => "POST",
        }
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Never fails; every problem is answered with an HTTP status.
#[tracing::instrument(level = "info", skip_all)]
pub async fn function_handler(
    dispatcher: &Dispatcher,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    Ok(route(dispatcher, &event.payload).await)
}

/// Routes one HTTP request payload and returns the response payload.
pub async fn route(dispatcher: &Dispatcher, payload: &Value) -> Value {
    let path = parsing::request_path(payload).unwrap_or("/");
    let method = parsing::request_method(payload).unwrap_or("GET");
    info!(raw_path = %path, method = %method, "Request path");

    let Some(route) = Route::from_path(path) else {
        return helpers::err_response(404, "Endpoint not found");
    };
    if !method.eq_ignore_ascii_case(route.method()) {
        return helpers::err_response(405, "Method not allowed");
    }

    match route {
        Route::Health => helpers::health(),
        Route::Webhook => handle_webhook(dispatcher, payload).await,
        Route::ManualTrigger => handle_manual_trigger(dispatcher, payload).await,
    }
}

async fn handle_webhook(dispatcher: &Dispatcher, payload: &Value) -> Value {
    let raw_body = match parsing::extract_body(payload) {
        Ok(body) => body,
        Err(e) => {
            error!("{}", e);
            return helpers::err_response(400, &e);
        }
    };

    let headers = payload.get("headers").unwrap_or(&Value::Null);
    let header = |name: &str| parsing::get_header_value(headers, name).map(str::to_string);
    let delivery = Delivery {
        event_type: header(parsing::EVENT_HEADER),
        delivery_id: header(parsing::DELIVERY_HEADER)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        signature_header: header(parsing::SIGNATURE_HEADER),
        raw_body,
    };

    let delivery_id = delivery.delivery_id.clone();
    let outcome = dispatcher.handle_delivery(delivery).await;
    helpers::webhook_response(&outcome, &delivery_id)
}

async fn handle_manual_trigger(dispatcher: &Dispatcher, payload: &Value) -> Value {
    let body = match parsing::extract_body(payload) {
        Ok(body) => body,
        Err(e) => return helpers::err_response(400, &e),
    };
    let trigger: ManualTrigger = match serde_json::from_slice(&body) {
        Ok(trigger) => trigger,
        Err(e) => {
            warn!("Manual trigger body parse error: {}", e);
            return helpers::err_response(400, &format!("Parse Error: {e}"));
        }
    };
    let Some(target) = trigger.into_target() else {
        return helpers::err_response(400, "Missing required fields: owner, repo, pr_number");
    };

    let outcome = dispatcher.run_manual(&target).await;
    helpers::manual_response(&outcome)
}
