// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::settings::CursorField;
use crate::context::OperationContext;
use crate::importer::{ImportError, OrderImporter};
use crate::logging::{error_report, ERROR_TITLE};
use crate::store::traits::RecordStore;
use crate::sync::cursor::{advance_cursor, CursorTracker};
use crate::sync::traits::{OrderSyncOutcome, OrderSyncReport, StockSyncOutcome, SyncService};
use crate::woocommerce::client::WooCommerceError;
use crate::woocommerce::models::{OrderEntry, OrderQuery, ProductBatch, StockUpdate};
use crate::woocommerce::traits::RemoteStore;

/// Runs the stock push and order pull flows against the record store.
///
/// Each flow holds its own lock for the whole run, so a scheduled run and an
/// on-demand run of the same flow are serialized.
pub struct SyncOrchestrator {
    store: Arc<dyn RecordStore>,
    remote: Arc<dyn RemoteStore>,
    importer: Arc<dyn OrderImporter>,
    stock_lock: Mutex<()>,
    order_lock: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        remote: Arc<dyn RemoteStore>,
        importer: Arc<dyn OrderImporter>,
    ) -> Self {
        Self {
            store,
            remote,
            importer,
            stock_lock: Mutex::new(()),
            order_lock: Mutex::new(()),
        }
    }

    /// Append to the error log. A failed write is logged and dropped so the
    /// caller still reports the error it is handling.
    async fn persist_error(&self, message: &str) {
        if let Err(e) = self.store.record_error(ERROR_TITLE, message).await {
            warn!(error = %e, "Failed to write error log");
        }
    }

    async fn record_remote_failure(&self, flow: &str, err: &WooCommerceError) {
        error!(flow, error = %err, "Storefront call failed, cursor left unchanged");
        let message = format!("{}\n{}", err, error_report(err.response_body()));
        self.persist_error(&message).await;
    }
}

#[async_trait]
impl SyncService for SyncOrchestrator {
    async fn sync_stock(&self, ctx: &OperationContext) -> anyhow::Result<StockSyncOutcome> {
        if !ctx.can_write() {
            warn!(identity = ctx.identity(), "Stock sync refused: no write permission");
            return Ok(StockSyncOutcome::Unauthorized);
        }

        let _running = self.stock_lock.lock().await;
        // Stored cursors keep microseconds
        let started = Utc::now().trunc_subsecs(6);

        let settings = self.store.load_settings().await?;
        if !settings.store.enable_stock_sync {
            info!("Stock sync is disabled");
            return Ok(StockSyncOutcome::Disabled);
        }

        let records = self
            .store
            .list_inventory(&settings.store.warehouse, settings.last_stock_sync)
            .await?;
        let scanned = records.len();

        let update: Vec<StockUpdate> = records
            .iter()
            .filter_map(|record| {
                record.remote_product_id.map(|id| StockUpdate {
                    id,
                    stock_quantity: record.actual_qty.trunc() as i64,
                    manage_stock: true,
                })
            })
            .collect();
        let skipped = scanned - update.len();

        if update.is_empty() {
            info!(scanned, warehouse = %settings.store.warehouse, "No stock changes to push");
            return Ok(StockSyncOutcome::NothingToPush { scanned });
        }

        let batch = ProductBatch { update };
        if let Err(e) = self.remote.batch_update_products(&batch).await {
            self.record_remote_failure("stock", &e).await;
            return Err(e.into());
        }

        let cursor = match advance_cursor(settings.last_stock_sync, Some(started)) {
            Some(cursor) => self.store.set_cursor(CursorField::Stock, cursor).await?,
            None => settings.last_stock_sync.unwrap_or(started),
        };

        info!(updated = batch.len(), skipped, cursor = %cursor, "Stock sync completed");
        Ok(StockSyncOutcome::Pushed {
            updated: batch.len(),
            skipped,
            cursor,
        })
    }

    async fn sync_orders(&self, ctx: &OperationContext) -> anyhow::Result<OrderSyncOutcome> {
        if !ctx.can_write() {
            warn!(identity = ctx.identity(), "Order sync refused: no write permission");
            return Ok(OrderSyncOutcome::Unauthorized);
        }

        let _running = self.order_lock.lock().await;

        let settings = self.store.load_settings().await?;
        if !settings.store.enable_order_sync {
            info!("Order sync is disabled");
            return Ok(OrderSyncOutcome::Disabled);
        }

        let previous = settings.last_order_sync;
        let query = OrderQuery::incremental(&settings.store, previous);
        info!(modified_after = ?previous, per_page = query.per_page, "Pulling orders");

        let mut report = OrderSyncReport::default();
        let mut tracker = CursorTracker::default();
        let mut orders = self.remote.get_orders(query);

        while let Some(next) = orders.next().await {
            let entry = match next {
                Ok(entry) => entry,
                Err(e) => {
                    self.record_remote_failure("orders", &e).await;
                    return Err(e.into());
                }
            };
            report.fetched += 1;

            let (remote_order_id, modified, result) = match entry {
                OrderEntry::Order(order) => {
                    let result = self.importer.import_order(&order, &settings, ctx).await;
                    (order.id, order.modified_at(), result)
                }
                OrderEntry::Malformed(bad) => {
                    let id = bad.id.unwrap_or_default();
                    let reason = format!("undecodable order: {}", bad.reason);
                    (id, bad.modified_at, Err(ImportError::mapping(id, reason)))
                }
            };

            match result {
                Ok(Some(_)) => {
                    report.imported += 1;
                    tracker.succeeded(modified);
                }
                Ok(None) => {
                    report.already_present += 1;
                    tracker.succeeded(modified);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(remote_order_id, error = %e, "Order import failed, continuing");
                    self.persist_error(&format!("Order {}: {}", remote_order_id, e))
                        .await;
                    tracker.failed(modified);
                }
            }
        }

        report.cursor = match advance_cursor(previous, tracker.cursor()) {
            Some(cursor) => Some(self.store.set_cursor(CursorField::Order, cursor).await?),
            None => previous,
        };

        info!(
            fetched = report.fetched,
            imported = report.imported,
            already_present = report.already_present,
            failed = report.failed,
            cursor = ?report.cursor,
            "Order sync completed"
        );
        Ok(OrderSyncOutcome::Pulled(report))
    }
}
