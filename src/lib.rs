// SPDX-License-Identifier: GPL-3.0-only
//! Stock and order synchronization between a local record store and a
//! WooCommerce storefront.

pub mod api;
pub mod config;
pub mod context;
pub mod importer;
pub mod logging;
pub mod scheduler;
pub mod store;
pub mod sync;
pub mod webhook;
pub mod woocommerce;

#[cfg(test)]
mod test_helpers;
