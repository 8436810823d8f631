use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

pub const EVENT_HEADER: &str = "X-GitHub-Event";
pub const DELIVERY_HEADER: &str = "X-GitHub-Delivery";
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Request path, preferring the HTTP API v2 field.
pub fn request_path(payload: &Value) -> Option<&str> {
    payload
        .get("rawPath")
        .and_then(|v| v.as_str())
        .or_else(|| payload.get("path").and_then(|v| v.as_str()))
}

pub fn request_method(payload: &Value) -> Option<&str> {
    payload
        .pointer("/requestContext/http/method")
        .and_then(|v| v.as_str())
        .or_else(|| payload.get("httpMethod").and_then(|v| v.as_str()))
}

/// The body bytes as they arrived on the wire. A missing body is empty.
///
/// # Errors
///
/// Returns an error when a body flagged as base64 does not decode.
pub fn extract_body(payload: &Value) -> Result<Vec<u8>, String> {
    let body = payload.get("body").and_then(|b| b.as_str()).unwrap_or("");
    let encoded = payload
        .get("isBase64Encoded")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if encoded {
        STANDARD
            .decode(body)
            .map_err(|e| format!("Failed to decode base64 body: {e}"))
    } else {
        Ok(body.as_bytes().to_vec())
    }
}
