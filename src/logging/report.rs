// SPDX-License-Identifier: GPL-3.0-only
use std::backtrace::Backtrace;

/// Title of persisted error log entries raised by storefront calls.
pub const ERROR_TITLE: &str = "WooCommerce Error";

/// Title of persisted error log entries raised by inbound webhooks.
pub const WEBHOOK_ERROR_TITLE: &str = "WooCommerce Webhook Error";

/// Placeholder when the storefront sent no body.
pub const NO_RESPONSE_DATA: &str = "No Response Data";

/// Error report for a failed storefront call: a backtrace of the caller
/// followed by the raw response body.
pub fn error_report(response_body: Option<&str>) -> String {
    let data = response_body
        .filter(|body| !body.trim().is_empty())
        .unwrap_or(NO_RESPONSE_DATA);

    format!("{}\n\n Request Data: \n{}", Backtrace::force_capture(), data)
}
