// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::settings::{CursorField, StoreSettings, SyncSettings};
use crate::store::models::{ErrorLogEntry, InventoryRecord, Item, LocalSalesOrder};

/// The ERP record layer as seen by the sync flows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the settings record; defaults when it was never saved
    async fn load_settings(&self) -> anyhow::Result<SyncSettings>;

    /// Overwrite the administrator part of the settings record, keeping both cursors
    async fn save_store_settings(&self, settings: &StoreSettings) -> anyhow::Result<()>;

    /// Single-column write of one cursor. The write is skipped when the stored
    /// value is already at or past `value`; returns the value stored afterwards
    async fn set_cursor(&self, field: CursorField, value: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>>;

    /// Insert or replace an item
    async fn upsert_item(&self, item: &Item) -> anyhow::Result<()>;

    /// Find the item linked to a storefront product id
    async fn item_for_remote_product(&self, remote_product_id: u64) -> anyhow::Result<Option<Item>>;

    /// Insert or replace the stock level of an (item, warehouse) pair
    async fn set_stock(
        &self,
        item_code: &str,
        warehouse: &str,
        actual_qty: f64,
        modified: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    /// Stock levels of a warehouse, optionally only those modified at or after `modified_since`
    async fn list_inventory(
        &self,
        warehouse: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<InventoryRecord>>;

    /// Find the sales order imported from a storefront order
    async fn find_sales_order(&self, remote_order_id: u64) -> anyhow::Result<Option<LocalSalesOrder>>;

    /// Insert a sales order. Returns `false` if one already exists for its remote order id
    async fn insert_sales_order(&self, order: &LocalSalesOrder) -> anyhow::Result<bool>;

    /// List all sales orders
    async fn list_sales_orders(&self) -> anyhow::Result<Vec<LocalSalesOrder>>;

    /// Append to the error log
    async fn record_error(&self, title: &str, message: &str) -> anyhow::Result<()>;

    /// Error log, oldest first
    async fn list_errors(&self) -> anyhow::Result<Vec<ErrorLogEntry>>;
}
