// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;

use crate::config::settings::SyncSettings;
use crate::context::OperationContext;
use crate::store::models::LocalSalesOrder;
use crate::woocommerce::models::RemoteOrder;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Cannot map order {remote_order_id}: {reason}")]
    Mapping { remote_order_id: u64, reason: String },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ImportError {
    pub fn mapping(remote_order_id: u64, reason: impl Into<String>) -> Self {
        ImportError::Mapping {
            remote_order_id,
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait OrderImporter: Send + Sync {
    /// Create the local sales order for `order` unless one already exists.
    /// Returns `None` when the order was imported before.
    async fn import_order(
        &self,
        order: &RemoteOrder,
        settings: &SyncSettings,
        ctx: &OperationContext,
    ) -> Result<Option<LocalSalesOrder>, ImportError>;
}
