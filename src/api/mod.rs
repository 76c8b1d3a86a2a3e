// SPDX-License-Identifier: GPL-3.0-only
pub mod handlers;
pub mod http;

pub use handlers::{ApiHandlers, ApiResponse};
pub use http::{router, HttpServer};
