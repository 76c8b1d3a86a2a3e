// SPDX-License-Identifier: GPL-3.0-only
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::importer::{ImportError, OrderImporter};
use crate::logging::WEBHOOK_ERROR_TITLE;
use crate::store::models::LocalSalesOrder;
use crate::store::traits::RecordStore;
use crate::webhook::auth::{verify_webhook, WebhookError};
use crate::webhook::payload::{parse_body, WebhookBody};
use crate::woocommerce::models::RemoteOrder;

/// Storefront webhook topics this daemon subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookAction {
    OrderCreated,
    OrderUpdated,
}

impl WebhookAction {
    pub const ALL: [WebhookAction; 2] = [WebhookAction::OrderCreated, WebhookAction::OrderUpdated];

    pub fn topic(self) -> &'static str {
        match self {
            WebhookAction::OrderCreated => "order.created",
            WebhookAction::OrderUpdated => "order.updated",
        }
    }

    /// Last path segment of the delivery URL.
    pub fn path(self) -> &'static str {
        match self {
            WebhookAction::OrderCreated => "order-created",
            WebhookAction::OrderUpdated => "order-updated",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.path() == path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Ping,
    Imported(LocalSalesOrder),
    AlreadyImported { remote_order_id: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookFailure {
    #[error(transparent)]
    Rejected(#[from] WebhookError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Authenticates deliveries and hands order payloads to the importer.
pub struct WebhookProcessor {
    store: Arc<dyn RecordStore>,
    importer: Arc<dyn OrderImporter>,
}

impl WebhookProcessor {
    pub fn new(store: Arc<dyn RecordStore>, importer: Arc<dyn OrderImporter>) -> Self {
        Self { store, importer }
    }

    /// Append to the error log. A failed write is logged and dropped so the
    /// delivery still gets the status of its own failure.
    async fn persist_error(&self, message: &str) {
        if let Err(e) = self.store.record_error(WEBHOOK_ERROR_TITLE, message).await {
            warn!(error = %e, "Failed to write error log");
        }
    }

    async fn reject(&self, action: WebhookAction, err: WebhookError) -> WebhookFailure {
        error!(topic = action.topic(), error = %err, "Rejected webhook delivery");
        self.persist_error(&err.to_string()).await;
        WebhookFailure::Rejected(err)
    }

    pub async fn process(
        &self,
        action: WebhookAction,
        signature: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookOutcome, WebhookFailure> {
        let settings = self.store.load_settings().await?;

        let ctx = match verify_webhook(body, signature, &settings.store) {
            Ok(ctx) => ctx,
            Err(e) => return Err(self.reject(action, e).await),
        };

        let payload = match parse_body(body) {
            Ok(WebhookBody::Ping) => {
                info!(topic = action.topic(), "Webhook ping received");
                return Ok(WebhookOutcome::Ping);
            }
            Ok(WebhookBody::Payload(value)) => value,
            Err(e) => return Err(self.reject(action, e).await),
        };

        let order: RemoteOrder = match serde_json::from_value(payload) {
            Ok(order) => order,
            Err(e) => {
                let err = WebhookError::InvalidPayload(e.to_string());
                return Err(self.reject(action, err).await);
            }
        };

        match self.importer.import_order(&order, &settings, &ctx).await {
            Ok(Some(sales_order)) => Ok(WebhookOutcome::Imported(sales_order)),
            Ok(None) => Ok(WebhookOutcome::AlreadyImported {
                remote_order_id: order.id,
            }),
            Err(e) => {
                warn!(topic = action.topic(), remote_order_id = order.id, error = %e, "Webhook import failed");
                self.persist_error(&e.to_string()).await;
                Err(e.into())
            }
        }
    }
}
