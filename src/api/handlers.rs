// SPDX-License-Identifier: GPL-3.0-only
use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::settings::WebhookEndpoint;
use crate::context::OperationContext;
use crate::importer::ImportError;
use crate::store::traits::RecordStore;
use crate::sync::traits::SyncService;
use crate::webhook::{
    tokens_match, WebhookAction, WebhookError, WebhookFailure, WebhookOutcome, WebhookProcessor,
    SIGNATURE_HEADER, SIGNATURE_HEADER_ALT,
};

/// Identity on-demand syncs run as when the admin token checks out.
pub const ADMIN_IDENTITY: &str = "api-admin";

const ANONYMOUS_IDENTITY: &str = "anonymous";

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiResponse::<()>::error(message.into())))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WebhookReply {
    Pong,
    Imported { sales_order: String, remote_order_id: u64 },
    AlreadyImported { remote_order_id: u64 },
}

/// Webhook setup read-out; never carries secrets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSettingsView {
    pub store_url: String,
    pub endpoints: Vec<WebhookEndpoint>,
    pub stock_sync_enabled: bool,
    pub order_sync_enabled: bool,
    pub last_stock_sync: Option<DateTime<Utc>>,
    pub last_order_sync: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFlow {
    Stock,
    Orders,
}

impl SyncFlow {
    fn name(self) -> &'static str {
        match self {
            SyncFlow::Stock => "stock",
            SyncFlow::Orders => "orders",
        }
    }
}

pub struct ApiHandlers {
    store: Arc<dyn RecordStore>,
    sync: Arc<dyn SyncService>,
    webhooks: Arc<WebhookProcessor>,
    admin_token: Option<String>,
}

impl ApiHandlers {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sync: Arc<dyn SyncService>,
        webhooks: Arc<WebhookProcessor>,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            store,
            sync,
            webhooks,
            admin_token: admin_token.filter(|token| !token.is_empty()),
        }
    }
}

impl ApiHandlers {
    pub async fn health() -> Json<ApiResponse<&'static str>> {
        Json(ApiResponse::success("ok"))
    }

    pub async fn webhook(
        &self,
        action: &str,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Json<ApiResponse<WebhookReply>>, ApiError> {
        let Some(action) = WebhookAction::from_path(action) else {
            return Err(api_error(StatusCode::NOT_FOUND, format!("Unknown webhook: {}", action)));
        };

        let signature = headers
            .get(SIGNATURE_HEADER)
            .or_else(|| headers.get(SIGNATURE_HEADER_ALT))
            .and_then(|value| value.to_str().ok());

        match self.webhooks.process(action, signature, &body).await {
            Ok(WebhookOutcome::Ping) => Ok(Json(ApiResponse::success(WebhookReply::Pong))),
            Ok(WebhookOutcome::Imported(order)) => Ok(Json(ApiResponse::success(WebhookReply::Imported {
                sales_order: order.name,
                remote_order_id: order.remote_order_id,
            }))),
            Ok(WebhookOutcome::AlreadyImported { remote_order_id }) => Ok(Json(ApiResponse::success(
                WebhookReply::AlreadyImported { remote_order_id },
            ))),
            Err(e) => Err(webhook_failure_response(e)),
        }
    }

    /// Start a sync flow in the background.
    pub async fn trigger_sync(
        &self,
        flow: SyncFlow,
        headers: &HeaderMap,
    ) -> Result<(StatusCode, Json<ApiResponse<&'static str>>), ApiError> {
        let ctx = self.request_context(headers);
        if !ctx.can_write() {
            warn!(flow = flow.name(), "On-demand sync refused: missing or wrong admin token");
            return Err(api_error(StatusCode::FORBIDDEN, "Not permitted"));
        }

        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            let result = match flow {
                SyncFlow::Stock => sync.sync_stock(&ctx).await.map(|outcome| format!("{:?}", outcome)),
                SyncFlow::Orders => sync.sync_orders(&ctx).await.map(|outcome| format!("{:?}", outcome)),
            };
            match result {
                Ok(outcome) => info!(flow = flow.name(), outcome = %outcome, "On-demand sync finished"),
                Err(e) => error!(flow = flow.name(), error = %e, "On-demand sync failed"),
            }
        });

        info!(flow = flow.name(), "On-demand sync started");
        Ok((StatusCode::ACCEPTED, Json(ApiResponse::success("started"))))
    }

    pub async fn webhook_settings(&self) -> Result<Json<ApiResponse<WebhookSettingsView>>, StatusCode> {
        match self.store.load_settings().await {
            Ok(settings) => Ok(Json(ApiResponse::success(WebhookSettingsView {
                store_url: settings.store.store_url,
                endpoints: settings.store.webhook_endpoints,
                stock_sync_enabled: settings.store.enable_stock_sync,
                order_sync_enabled: settings.store.enable_order_sync,
                last_stock_sync: settings.last_stock_sync,
                last_order_sync: settings.last_order_sync,
            }))),
            Err(e) => {
                error!(error = %e, "Failed to load settings");
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn request_context(&self, headers: &HeaderMap) -> OperationContext {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match (&self.admin_token, bearer) {
            (Some(expected), Some(given)) if tokens_match(expected, given.trim()) => {
                OperationContext::new(ADMIN_IDENTITY, true)
            }
            _ => OperationContext::read_only(ANONYMOUS_IDENTITY),
        }
    }
}

fn webhook_failure_response(failure: WebhookFailure) -> ApiError {
    let status = match &failure {
        WebhookFailure::Rejected(WebhookError::AuthenticationFailure) => StatusCode::UNAUTHORIZED,
        WebhookFailure::Rejected(WebhookError::EmptyPayload)
        | WebhookFailure::Rejected(WebhookError::InvalidPayload(_)) => StatusCode::BAD_REQUEST,
        WebhookFailure::Import(ImportError::Mapping { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        WebhookFailure::Import(ImportError::Store(_)) | WebhookFailure::Internal(_) => {
            error!(error = %failure, "Webhook processing failed");
            return api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
        }
    };
    api_error(status, failure.to_string())
}
