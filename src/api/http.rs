// SPDX-License-Identifier: GPL-3.0-only
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::api::handlers::{
    ApiError, ApiHandlers, ApiResponse, SyncFlow, WebhookReply, WebhookSettingsView,
};

pub struct HttpServer {
    handlers: ApiHandlers,
    addr: SocketAddr,
}

impl HttpServer {
    pub fn new(handlers: ApiHandlers, addr: SocketAddr) -> Self {
        Self { handlers, addr }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let app = router(Arc::new(self.handlers));

        info!(addr = %self.addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

pub fn router(handlers: Arc<ApiHandlers>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/webhooks/:action", post(webhook_handler))
        .route("/api/sync/stock", post(sync_stock_handler))
        .route("/api/sync/orders", post(sync_orders_handler))
        .route("/api/settings/webhooks", get(webhook_settings_handler))
        .with_state(handlers)
}

async fn health_handler() -> Json<ApiResponse<&'static str>> {
    ApiHandlers::health().await
}

async fn webhook_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    Path(action): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<WebhookReply>>, ApiError> {
    handlers.webhook(&action, &headers, body).await
}

async fn sync_stock_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ApiResponse<&'static str>>), ApiError> {
    handlers.trigger_sync(SyncFlow::Stock, &headers).await
}

async fn sync_orders_handler(
    State(handlers): State<Arc<ApiHandlers>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<ApiResponse<&'static str>>), ApiError> {
    handlers.trigger_sync(SyncFlow::Orders, &headers).await
}

async fn webhook_settings_handler(
    State(handlers): State<Arc<ApiHandlers>>,
) -> Result<Json<ApiResponse<WebhookSettingsView>>, StatusCode> {
    handlers.webhook_settings().await
}
