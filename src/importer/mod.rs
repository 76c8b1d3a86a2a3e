// SPDX-License-Identifier: GPL-3.0-only
pub mod sales_order;
pub mod traits;

pub use sales_order::SalesOrderImporter;
pub use traits::{ImportError, OrderImporter};
