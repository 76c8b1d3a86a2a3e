// SPDX-License-Identifier: GPL-3.0-only
use serde_json::Value;

use crate::webhook::auth::WebhookError;

/// What an authenticated delivery carries.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookBody {
    /// Reachability check sent when the webhook is saved on the storefront
    Ping,
    Payload(Value),
}

/// Tell a ping apart from an event payload.
///
/// A JSON string mentioning `webhook_id` and a form body `webhook_id=<n>` are
/// pings. A JSON string holding JSON is unwrapped. Objects and arrays are
/// payloads.
pub fn parse_body(body: &[u8]) -> Result<WebhookBody, WebhookError> {
    if body.is_empty() {
        return Err(WebhookError::EmptyPayload);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::String(text)) => {
            if text.contains("webhook_id") {
                return Ok(WebhookBody::Ping);
            }
            let inner: Value = serde_json::from_str(&text)
                .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;
            into_payload(inner)
        }
        Ok(value) => into_payload(value),
        Err(e) => {
            if is_form_ping(&String::from_utf8_lossy(body)) {
                Ok(WebhookBody::Ping)
            } else {
                Err(WebhookError::InvalidPayload(e.to_string()))
            }
        }
    }
}

fn into_payload(value: Value) -> Result<WebhookBody, WebhookError> {
    match value {
        Value::Object(_) | Value::Array(_) => Ok(WebhookBody::Payload(value)),
        _ => Err(WebhookError::InvalidPayload(
            "expected a JSON object or array".to_string(),
        )),
    }
}

fn is_form_ping(text: &str) -> bool {
    text.trim()
        .split('&')
        .any(|pair| pair.split('=').next() == Some("webhook_id"))
}
