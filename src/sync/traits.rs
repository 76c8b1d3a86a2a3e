// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::OperationContext;

#[derive(Debug, Clone, PartialEq)]
pub enum StockSyncOutcome {
    /// The acting identity may not write sync state
    Unauthorized,
    Disabled,
    /// Nothing linked to the storefront changed since the last push
    NothingToPush { scanned: usize },
    Pushed {
        updated: usize,
        skipped: usize,
        cursor: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderSyncReport {
    pub fetched: usize,
    pub imported: usize,
    pub already_present: usize,
    pub failed: usize,
    /// Order cursor after the run
    pub cursor: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderSyncOutcome {
    Unauthorized,
    Disabled,
    Pulled(OrderSyncReport),
}

#[async_trait]
pub trait SyncService: Send + Sync {
    /// Push stock levels changed since the last push to the storefront
    async fn sync_stock(&self, ctx: &OperationContext) -> anyhow::Result<StockSyncOutcome>;

    /// Pull orders modified since the last pull and import them
    async fn sync_orders(&self, ctx: &OperationContext) -> anyhow::Result<OrderSyncOutcome>;
}
