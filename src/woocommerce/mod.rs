// SPDX-License-Identifier: GPL-3.0-only
pub mod client;
pub mod models;
pub mod traits;

pub use client::{ApiMethod, WooCommerceClient, WooCommerceError, TOTAL_PAGES_HEADER};
pub use models::{
    Address, LineItem, MalformedOrder, OrderEntry, OrderQuery, ProductBatch, RemoteOrder, SortOrder,
    StockUpdate,
};
pub use traits::RemoteStore;
