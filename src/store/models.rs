// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ERP item, optionally linked to a storefront product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_code: String,
    pub item_name: String,
    /// Storefront product (or variation) id
    pub remote_product_id: Option<u64>,
}

impl Item {
    pub fn new(item_code: impl Into<String>, remote_product_id: Option<u64>) -> Self {
        let item_code = item_code.into();
        Self {
            item_name: item_code.clone(),
            item_code,
            remote_product_id,
        }
    }
}

/// Stock on hand for one (item, warehouse) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_code: String,
    pub warehouse: String,
    pub actual_qty: f64,
    pub modified: DateTime<Utc>,
    /// Resolved from the item; `None` when the item is not on the storefront
    pub remote_product_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrderLine {
    pub item_code: String,
    pub remote_product_id: u64,
    pub qty: f64,
    pub rate: f64,
    pub amount: f64,
}

/// ERP-side sales order created from a storefront order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSalesOrder {
    /// Document name, `<series><remote id>`
    pub name: String,

    /// Storefront order id; unique across all sales orders
    pub remote_order_id: u64,

    pub customer: String,

    pub customer_email: Option<String>,

    pub transaction_date: DateTime<Utc>,

    pub currency: String,

    pub grand_total: f64,

    pub shipping_address: Option<String>,

    /// Identity the order was created by
    pub owner: String,

    pub created_at: DateTime<Utc>,

    pub items: Vec<SalesOrderLine>,
}

/// Persisted error record, the ERP's "Error Log".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_new_uses_code_as_name() {
        let item = Item::new("WIDGET-01", Some(42));
        assert_eq!(item.item_code, "WIDGET-01");
        assert_eq!(item.item_name, "WIDGET-01");
        assert_eq!(item.remote_product_id, Some(42));
    }

    #[test]
    fn test_sales_order_serialize_json() {
        let order = LocalSalesOrder {
            name: "SO-WOO-1001".to_string(),
            remote_order_id: 1001,
            customer: "Jane Doe".to_string(),
            customer_email: None,
            transaction_date: "2024-03-01T10:00:00Z".parse().unwrap(),
            currency: "EUR".to_string(),
            grand_total: 19.5,
            shipping_address: None,
            owner: "Administrator".to_string(),
            created_at: "2024-03-01T10:00:05Z".parse().unwrap(),
            items: vec![SalesOrderLine {
                item_code: "WIDGET-01".to_string(),
                remote_product_id: 42,
                qty: 3.0,
                rate: 6.5,
                amount: 19.5,
            }],
        };

        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"name\":\"SO-WOO-1001\""));
        assert!(json.contains("\"remote_order_id\":1001"));
        assert!(json.contains("\"customer_email\":null"));
        assert!(json.contains("\"item_code\":\"WIDGET-01\""));
    }
}
