// SPDX-License-Identifier: GPL-3.0-only
pub mod models;
pub mod traits;
pub mod sqlite;

pub use models::{ErrorLogEntry, InventoryRecord, Item, LocalSalesOrder, SalesOrderLine};
pub use traits::RecordStore;
pub use sqlite::SqliteStore;
