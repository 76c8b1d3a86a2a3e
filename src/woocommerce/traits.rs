// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde_json::Value;

use crate::woocommerce::client::WooCommerceError;
use crate::woocommerce::models::{OrderEntry, OrderQuery, ProductBatch, RemoteOrder};

/// The storefront REST surface used by the sync flows.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List products matching the given query parameters
    async fn get_products(&self, params: &[(String, String)]) -> Result<Vec<Value>, WooCommerceError>;

    async fn get_product(&self, id: u64) -> Result<Value, WooCommerceError>;

    async fn create_product(&self, product: &Value) -> Result<Value, WooCommerceError>;

    async fn update_product(&self, id: u64, product: &Value) -> Result<Value, WooCommerceError>;

    /// Update many products in a single call
    async fn batch_update_products(&self, batch: &ProductBatch) -> Result<Value, WooCommerceError>;

    /// Delete a product; without `force` the storefront moves it to the trash
    async fn delete_product(&self, id: u64, force: bool) -> Result<Value, WooCommerceError>;

    /// All orders matching `query`, page by page, fetched as the stream is polled.
    /// Each call starts again from page 1. An order that fails to decode is
    /// yielded as [`OrderEntry::Malformed`]; only transport and HTTP failures
    /// end the stream with an error.
    fn get_orders(&self, query: OrderQuery) -> BoxStream<'_, Result<OrderEntry, WooCommerceError>>;

    async fn get_order(&self, id: u64) -> Result<RemoteOrder, WooCommerceError>;
}
