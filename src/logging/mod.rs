// SPDX-License-Identifier: GPL-3.0-only
pub mod report;
pub mod setup;

pub use report::{error_report, ERROR_TITLE, NO_RESPONSE_DATA, WEBHOOK_ERROR_TITLE};
pub use setup::setup_logging;
