// SPDX-License-Identifier: GPL-3.0-only
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::settings::StoreSettings;
use crate::context::OperationContext;

type HmacSha256 = Hmac<Sha256>;

/// Header the storefront puts the body signature in.
pub const SIGNATURE_HEADER: &str = "x-wc-webhook-signature";

/// Generic spelling accepted as well.
pub const SIGNATURE_HEADER_ALT: &str = "x-webhook-signature";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("No Webhook Data")]
    EmptyPayload,

    #[error("Unverified Webhook Data")]
    AuthenticationFailure,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Base64 HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key of any size");
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Compare a presented token with the configured one in constant time.
///
/// Both are MACed under the configured token so the comparison runs over
/// equal-length digests whatever the token lengths.
pub fn tokens_match(expected: &str, given: &str) -> bool {
    let Ok(keyed) = HmacSha256::new_from_slice(expected.as_bytes()) else {
        return false;
    };

    let mut reference = keyed.clone();
    reference.update(expected.as_bytes());
    let reference = reference.finalize().into_bytes();

    let mut presented = keyed;
    presented.update(given.as_bytes());
    presented.verify_slice(&reference).is_ok()
}

/// Authenticate a webhook delivery.
///
/// An empty body is rejected before the signature is looked at. The
/// signature check decodes the header and compares MACs in constant time.
/// An unset webhook secret rejects every delivery. On success the returned
/// context carries the configured default identity.
pub fn verify_webhook(
    body: &[u8],
    signature: Option<&str>,
    settings: &StoreSettings,
) -> Result<OperationContext, WebhookError> {
    if body.is_empty() {
        return Err(WebhookError::EmptyPayload);
    }

    if settings.webhook_secret.is_empty() {
        return Err(WebhookError::AuthenticationFailure);
    }

    let signature = signature.ok_or(WebhookError::AuthenticationFailure)?;
    let expected = STANDARD
        .decode(signature.as_bytes())
        .map_err(|_| WebhookError::AuthenticationFailure)?;

    let mut mac = HmacSha256::new_from_slice(settings.webhook_secret.as_bytes())
        .map_err(|_| WebhookError::AuthenticationFailure)?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| WebhookError::AuthenticationFailure)?;

    Ok(OperationContext::default_identity(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_secret(secret: &str) -> StoreSettings {
        StoreSettings {
            webhook_secret: secret.to_string(),
            default_identity: "webhook-user".to_string(),
            ..StoreSettings::default()
        }
    }

    #[test]
    fn test_sign_matches_known_vector() {
        assert_eq!(
            sign("test-secret", br#"{"id":1}"#),
            "H19jdkTt0bdVHJbmH87mtfSa7ud+merMEAWsvbbRGkY="
        );
    }

    #[test]
    fn test_valid_signature_accepted_with_default_identity() {
        let settings = settings_with_secret("test-secret");
        let body = br#"{"id":1}"#;
        let signature = sign("test-secret", body);

        let ctx = verify_webhook(body, Some(&signature), &settings).unwrap();
        assert_eq!(ctx.identity(), "webhook-user");
        assert!(ctx.can_write());
    }

    #[test]
    fn test_empty_body_rejected_regardless_of_header() {
        let settings = settings_with_secret("test-secret");
        let valid_for_empty = sign("test-secret", b"");

        assert_eq!(
            verify_webhook(b"", Some(&valid_for_empty), &settings),
            Err(WebhookError::EmptyPayload)
        );
        assert_eq!(verify_webhook(b"", None, &settings), Err(WebhookError::EmptyPayload));
        assert_eq!(
            verify_webhook(b"", Some("garbage"), &settings_with_secret("")),
            Err(WebhookError::EmptyPayload)
        );
    }

    #[test]
    fn test_missing_or_undecodable_header_rejected() {
        let settings = settings_with_secret("test-secret");
        assert_eq!(
            verify_webhook(b"{}", None, &settings),
            Err(WebhookError::AuthenticationFailure)
        );
        assert_eq!(
            verify_webhook(b"{}", Some("not base64!"), &settings),
            Err(WebhookError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let settings = settings_with_secret("test-secret");
        let signature = sign("other-secret", b"{}");
        assert_eq!(
            verify_webhook(b"{}", Some(&signature), &settings),
            Err(WebhookError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_unset_secret_rejects_everything() {
        let settings = settings_with_secret("");
        let signature = sign("", b"{}");
        assert_eq!(
            verify_webhook(b"{}", Some(&signature), &settings),
            Err(WebhookError::AuthenticationFailure)
        );
    }

    #[test]
    fn test_flipping_any_body_byte_rejects() {
        let settings = settings_with_secret("test-secret");
        let body = br#"{"id":727,"status":"processing"}"#.to_vec();
        let signature = sign("test-secret", &body);

        for i in 0..body.len() {
            let mut tampered = body.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                verify_webhook(&tampered, Some(&signature), &settings),
                Err(WebhookError::AuthenticationFailure),
                "tampered byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_flipping_any_header_byte_rejects() {
        let settings = settings_with_secret("test-secret");
        let body = br#"{"id":727}"#;
        let signature = sign("test-secret", body);

        for i in 0..signature.len() {
            let mut tampered = signature.clone().into_bytes();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8_lossy(&tampered).into_owned();
            assert_eq!(
                verify_webhook(body, Some(&tampered), &settings),
                Err(WebhookError::AuthenticationFailure),
                "tampered header byte {i} was accepted"
            );
        }
    }

    #[test]
    fn test_various_secrets_and_bodies() {
        let secrets = ["s", "a much longer shared secret with spaces", "ünïcödé"];
        let bodies: [&[u8]; 3] = [b"[]", br#"{"id":1,"line_items":[]}"#, "\"webhook_id=1\"".as_bytes()];

        for secret in secrets {
            let settings = settings_with_secret(secret);
            for body in bodies {
                let signature = sign(secret, body);
                assert!(verify_webhook(body, Some(&signature), &settings).is_ok());
            }
        }
    }

    #[test]
    fn test_tokens_match_only_on_equal_tokens() {
        assert!(tokens_match("s3cret-admin", "s3cret-admin"));
        assert!(!tokens_match("s3cret-admin", "s3cret-admiN"));
        assert!(!tokens_match("s3cret-admin", "s3cret"));
        assert!(!tokens_match("s3cret-admin", "s3cret-admin-and-more"));
        assert!(!tokens_match("s3cret-admin", ""));
    }
}
