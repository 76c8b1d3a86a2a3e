// SPDX-License-Identifier: GPL-3.0-only
pub mod auth;
pub mod payload;
pub mod service;

pub use auth::{sign, tokens_match, verify_webhook, WebhookError, SIGNATURE_HEADER, SIGNATURE_HEADER_ALT};
pub use payload::{parse_body, WebhookBody};
pub use service::{WebhookAction, WebhookFailure, WebhookOutcome, WebhookProcessor};
