// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::settings::SyncSettings;
use crate::context::OperationContext;
use crate::importer::traits::{ImportError, OrderImporter};
use crate::store::models::{LocalSalesOrder, SalesOrderLine};
use crate::store::traits::RecordStore;
use crate::woocommerce::models::{Address, LineItem, RemoteOrder};

const GUEST_CUSTOMER: &str = "Guest";

/// Maps storefront orders onto sales orders in the record store.
pub struct SalesOrderImporter {
    store: Arc<dyn RecordStore>,
}

impl SalesOrderImporter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    async fn map_line(&self, order_id: u64, line: &LineItem) -> Result<SalesOrderLine, ImportError> {
        if line.quantity <= 0.0 {
            return Err(ImportError::mapping(
                order_id,
                format!("line {} has non-positive quantity {}", line.id, line.quantity),
            ));
        }

        // Variations are usually linked individually; fall back to the parent product
        let mut candidates = Vec::with_capacity(2);
        if line.variation_id != 0 {
            candidates.push(line.variation_id);
        }
        candidates.push(line.product_id);

        let mut resolved = None;
        for product_id in candidates {
            if let Some(item) = self.store.item_for_remote_product(product_id).await? {
                resolved = Some((item, product_id));
                break;
            }
        }

        let Some((item, remote_product_id)) = resolved else {
            return Err(ImportError::mapping(
                order_id,
                format!("no item linked to product {} ({})", line.product_id, line.name),
            ));
        };

        let amount = parse_decimal(&line.total).unwrap_or(line.price * line.quantity);
        let rate = if line.price > 0.0 { line.price } else { amount / line.quantity };

        Ok(SalesOrderLine {
            item_code: item.item_code,
            remote_product_id,
            qty: line.quantity,
            rate,
            amount,
        })
    }

    async fn map_order(
        &self,
        order: &RemoteOrder,
        settings: &SyncSettings,
        ctx: &OperationContext,
    ) -> Result<LocalSalesOrder, ImportError> {
        if order.line_items.is_empty() {
            return Err(ImportError::mapping(order.id, "order has no line items"));
        }

        let mut items = Vec::with_capacity(order.line_items.len());
        for line in &order.line_items {
            items.push(self.map_line(order.id, line).await?);
        }

        let grand_total = parse_decimal(&order.total)
            .unwrap_or_else(|| items.iter().map(|line| line.amount).sum());

        // The record store keeps microseconds
        let now = Utc::now().trunc_subsecs(6);
        Ok(LocalSalesOrder {
            name: format!("{}{}", settings.store.sales_order_series, order.id),
            remote_order_id: order.id,
            customer: resolve_customer(&order.billing),
            customer_email: Some(order.billing.email.trim().to_string()).filter(|e| !e.is_empty()),
            transaction_date: order.created_at().unwrap_or(now),
            currency: order.currency.clone(),
            grand_total,
            shipping_address: order.shipping.display().or_else(|| order.billing.display()),
            owner: ctx.identity().to_string(),
            created_at: now,
            items,
        })
    }
}

#[async_trait]
impl OrderImporter for SalesOrderImporter {
    async fn import_order(
        &self,
        order: &RemoteOrder,
        settings: &SyncSettings,
        ctx: &OperationContext,
    ) -> Result<Option<LocalSalesOrder>, ImportError> {
        if let Some(existing) = self.store.find_sales_order(order.id).await? {
            debug!(remote_order_id = order.id, name = %existing.name, "Order already imported");
            return Ok(None);
        }

        let sales_order = self.map_order(order, settings, ctx).await?;

        if !self.store.insert_sales_order(&sales_order).await? {
            debug!(remote_order_id = order.id, "Order imported concurrently");
            return Ok(None);
        }

        info!(
            remote_order_id = order.id,
            name = %sales_order.name,
            owner = %sales_order.owner,
            lines = sales_order.items.len(),
            "Imported order"
        );
        Ok(Some(sales_order))
    }
}

fn resolve_customer(billing: &Address) -> String {
    let company = billing.company.trim();
    if !company.is_empty() {
        return company.to_string();
    }

    let name = billing.full_name();
    if !name.is_empty() {
        return name;
    }

    let email = billing.email.trim();
    if !email.is_empty() {
        return email.to_string();
    }

    GUEST_CUSTOMER.to_string()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
