// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::settings::{CursorField, StoreSettings, SyncSettings};
use crate::store::models::{ErrorLogEntry, InventoryRecord, Item, LocalSalesOrder};
use crate::store::{RecordStore, SqliteStore};
use crate::woocommerce::models::RemoteOrder;
use crate::woocommerce::WooCommerceClient;

pub const TEST_WEBHOOK_SECRET: &str = "test-secret";

/// Create an in-memory record store for testing
pub async fn setup_test_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::in_memory().await.expect("in-memory store"))
}

/// Store settings pointing at a mock storefront, with both flows enabled
pub fn test_store_settings(store_url: &str) -> StoreSettings {
    StoreSettings {
        store_url: store_url.to_string(),
        consumer_key: "ck_test".to_string(),
        consumer_secret: "cs_test".to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
        default_identity: "shop-bot".to_string(),
        enable_stock_sync: true,
        warehouse: "Stores - WH".to_string(),
        enable_order_sync: true,
        ..StoreSettings::default()
    }
}

pub fn test_sync_settings() -> SyncSettings {
    SyncSettings {
        store: test_store_settings("http://127.0.0.1:1"),
        ..SyncSettings::default()
    }
}

pub fn test_client(store_url: &str) -> WooCommerceClient {
    WooCommerceClient::new(&test_store_settings(store_url), Duration::from_secs(5))
        .expect("test client")
}

/// Storefront order JSON with one line of two units at 10.00
pub fn remote_order_json(id: u64, modified_gmt: &str, product_id: u64) -> Value {
    json!({
        "id": id,
        "status": "processing",
        "currency": "EUR",
        "date_created": "2024-03-01T09:00:00",
        "date_created_gmt": "2024-03-01T09:00:00",
        "date_modified": modified_gmt,
        "date_modified_gmt": modified_gmt,
        "total": "20.00",
        "customer_id": 7,
        "billing": {
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "address_1": "1 Main St",
            "city": "Springfield",
            "postcode": "12345",
            "country": "US"
        },
        "shipping": {
            "first_name": "Jane",
            "last_name": "Doe",
            "address_1": "1 Main St",
            "city": "Springfield",
            "postcode": "12345",
            "country": "US"
        },
        "line_items": [{
            "id": id * 10,
            "name": "Widget",
            "product_id": product_id,
            "variation_id": 0,
            "quantity": 2,
            "price": 10.0,
            "total": "20.00",
            "sku": "WIDGET-01"
        }]
    })
}

pub fn remote_order(id: u64, modified_gmt: &str, product_id: u64) -> RemoteOrder {
    serde_json::from_value(remote_order_json(id, modified_gmt, product_id)).expect("order fixture")
}

/// Record store whose error log cannot be written; everything else is delegated
pub struct BrokenErrorLog {
    pub inner: Arc<SqliteStore>,
}

#[async_trait]
impl RecordStore for BrokenErrorLog {
    async fn load_settings(&self) -> anyhow::Result<SyncSettings> {
        self.inner.load_settings().await
    }

    async fn save_store_settings(&self, settings: &StoreSettings) -> anyhow::Result<()> {
        self.inner.save_store_settings(settings).await
    }

    async fn set_cursor(&self, field: CursorField, value: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
        self.inner.set_cursor(field, value).await
    }

    async fn upsert_item(&self, item: &Item) -> anyhow::Result<()> {
        self.inner.upsert_item(item).await
    }

    async fn item_for_remote_product(&self, remote_product_id: u64) -> anyhow::Result<Option<Item>> {
        self.inner.item_for_remote_product(remote_product_id).await
    }

    async fn set_stock(
        &self,
        item_code: &str,
        warehouse: &str,
        actual_qty: f64,
        modified: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.inner.set_stock(item_code, warehouse, actual_qty, modified).await
    }

    async fn list_inventory(
        &self,
        warehouse: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<InventoryRecord>> {
        self.inner.list_inventory(warehouse, modified_since).await
    }

    async fn find_sales_order(&self, remote_order_id: u64) -> anyhow::Result<Option<LocalSalesOrder>> {
        self.inner.find_sales_order(remote_order_id).await
    }

    async fn insert_sales_order(&self, order: &LocalSalesOrder) -> anyhow::Result<bool> {
        self.inner.insert_sales_order(order).await
    }

    async fn list_sales_orders(&self) -> anyhow::Result<Vec<LocalSalesOrder>> {
        self.inner.list_sales_orders().await
    }

    async fn record_error(&self, _title: &str, _message: &str) -> anyhow::Result<()> {
        anyhow::bail!("error log is read-only")
    }

    async fn list_errors(&self) -> anyhow::Result<Vec<ErrorLogEntry>> {
        self.inner.list_errors().await
    }
}
