// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::settings::StoreSettings;

/// Format the storefront expects for `modified_after` and friends.
const QUERY_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The storefront sends `null` for fields of deleted products and guests.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address_1: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address_2: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub postcode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
}

impl Address {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Multi-line postal address; `None` when every field is blank.
    pub fn display(&self) -> Option<String> {
        let name = self.full_name();
        let city_line = format!("{} {}", self.postcode.trim(), self.city.trim());
        let lines: Vec<&str> = [
            name.as_str(),
            self.company.trim(),
            self.address_1.trim(),
            self.address_2.trim(),
            city_line.trim(),
            self.state.trim(),
            self.country.trim(),
        ]
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect();

        if lines.is_empty() { None } else { Some(lines.join("\n")) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub product_id: u64,
    /// Zero for simple products
    #[serde(deserialize_with = "null_as_default")]
    pub variation_id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: f64,
    /// Unit price
    #[serde(deserialize_with = "null_as_default")]
    pub price: f64,
    /// Line total as a decimal string
    #[serde(deserialize_with = "null_as_default")]
    pub total: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sku: String,
}

/// Storefront order as returned by `GET orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteOrder {
    pub id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,

    #[serde(default)]
    pub date_created: Option<NaiveDateTime>,

    #[serde(default)]
    pub date_created_gmt: Option<NaiveDateTime>,

    #[serde(default)]
    pub date_modified: Option<NaiveDateTime>,

    #[serde(default)]
    pub date_modified_gmt: Option<NaiveDateTime>,

    /// Grand total as a decimal string
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_id: u64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_note: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub billing: Address,

    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping: Address,

    #[serde(default, deserialize_with = "null_as_default")]
    pub line_items: Vec<LineItem>,
}

impl RemoteOrder {
    /// Modification time, GMT preferred.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.date_modified_gmt
            .or(self.date_modified)
            .map(|naive| naive.and_utc())
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.date_created_gmt
            .or(self.date_created)
            .map(|naive| naive.and_utc())
    }
}

/// An order that came back on a page but could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedOrder {
    pub id: Option<u64>,
    pub modified_at: Option<DateTime<Utc>>,
    pub reason: String,
}

/// One entry of an order page. Entries are decoded one by one so a single
/// bad order does not take the rest of its page down with it.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEntry {
    Order(RemoteOrder),
    Malformed(MalformedOrder),
}

impl OrderEntry {
    pub fn from_value(value: Value) -> Self {
        let id = value.get("id").and_then(Value::as_u64);
        let modified_at = ["date_modified_gmt", "date_modified"]
            .iter()
            .filter_map(|field| value.get(*field).and_then(Value::as_str))
            .find_map(|raw| NaiveDateTime::parse_from_str(raw, QUERY_DATETIME_FORMAT).ok())
            .map(|naive| naive.and_utc());

        match serde_json::from_value::<RemoteOrder>(value) {
            Ok(order) => OrderEntry::Order(order),
            Err(e) => OrderEntry::Malformed(MalformedOrder {
                id,
                modified_at,
                reason: e.to_string(),
            }),
        }
    }

    pub fn id(&self) -> Option<u64> {
        match self {
            OrderEntry::Order(order) => Some(order.id),
            OrderEntry::Malformed(bad) => bad.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters for `GET orders`, reused for every page.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuery {
    pub per_page: u32,
    pub modified_after: Option<DateTime<Utc>>,
    pub status: Vec<String>,
    pub orderby: String,
    pub order: SortOrder,
}

impl OrderQuery {
    /// Incremental pull: oldest modification first, starting after the cursor.
    pub fn incremental(settings: &StoreSettings, modified_after: Option<DateTime<Utc>>) -> Self {
        Self {
            per_page: settings.page_size(),
            modified_after,
            status: settings.order_status_filters.clone(),
            orderby: String::from("modified"),
            order: SortOrder::Asc,
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("per_page".to_string(), self.per_page.to_string())];

        if let Some(after) = self.modified_after {
            params.push((
                "modified_after".to_string(),
                after.format(QUERY_DATETIME_FORMAT).to_string(),
            ));
            // Cursors are UTC
            params.push(("dates_are_gmt".to_string(), "true".to_string()));
        }

        if !self.status.is_empty() {
            params.push(("status".to_string(), self.status.join(",")));
        }

        params.push(("orderby".to_string(), self.orderby.clone()));
        params.push(("order".to_string(), self.order.as_str().to_string()));
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub id: u64,
    pub stock_quantity: i64,
    pub manage_stock: bool,
}

/// Body of `POST products/batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductBatch {
    pub update: Vec<StockUpdate>,
}

impl ProductBatch {
    pub fn is_empty(&self) -> bool {
        self.update.is_empty()
    }

    pub fn len(&self) -> usize {
        self.update.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_remote_order_deserialize_storefront_payload() {
        let payload = json!({
            "id": 727,
            "status": "processing",
            "currency": "USD",
            "date_created": "2017-03-22T16:28:02",
            "date_created_gmt": "2017-03-22T19:28:02",
            "date_modified": "2017-03-22T16:28:08",
            "date_modified_gmt": "2017-03-22T19:28:08",
            "total": "29.35",
            "customer_id": 0,
            "customer_note": "",
            "billing": {
                "first_name": "John",
                "last_name": "Doe",
                "company": "",
                "address_1": "969 Market",
                "city": "San Francisco",
                "postcode": "94103",
                "country": "US",
                "email": "john.doe@example.com",
                "phone": "(555) 555-5555"
            },
            "shipping": {
                "first_name": "John",
                "last_name": "Doe",
                "address_1": "969 Market",
                "city": "San Francisco",
                "postcode": "94103",
                "country": "US"
            },
            "line_items": [{
                "id": 315,
                "name": "Woo Single #1",
                "product_id": 93,
                "variation_id": 0,
                "quantity": 2,
                "price": 3,
                "total": "6.00",
                "sku": ""
            }],
            "meta_data": []
        });

        let order: RemoteOrder = serde_json::from_value(payload).unwrap();
        assert_eq!(order.id, 727);
        assert_eq!(order.billing.email, "john.doe@example.com");
        assert_eq!(order.line_items.len(), 1);
        assert_eq!(order.line_items[0].quantity, 2.0);
        assert_eq!(order.line_items[0].price, 3.0);
        assert_eq!(
            order.modified_at(),
            Some(Utc.with_ymd_and_hms(2017, 3, 22, 19, 28, 8).unwrap())
        );
        assert_eq!(
            order.created_at(),
            Some(Utc.with_ymd_and_hms(2017, 3, 22, 19, 28, 2).unwrap())
        );
    }

    #[test]
    fn test_modified_at_falls_back_to_local_date() {
        let order: RemoteOrder = serde_json::from_value(json!({
            "id": 1,
            "date_modified": "2024-01-05T08:00:00",
            "date_modified_gmt": null
        }))
        .unwrap();
        assert_eq!(
            order.modified_at(),
            Some(Utc.with_ymd_and_hms(2024, 1, 5, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_null_strings_read_as_empty() {
        let order: RemoteOrder = serde_json::from_value(json!({
            "id": 2,
            "customer_note": null,
            "billing": {"company": null, "email": "guest@example.com"},
            "shipping": null,
            "line_items": [{"id": 20, "product_id": 42, "quantity": 1, "sku": null, "total": "5.00"}]
        }))
        .unwrap();

        assert_eq!(order.customer_note, "");
        assert_eq!(order.billing.company, "");
        assert_eq!(order.shipping, Address::default());
        assert_eq!(order.line_items[0].sku, "");
    }

    #[test]
    fn test_order_entry_keeps_id_and_timestamp_of_bad_order() {
        let entry = OrderEntry::from_value(json!({
            "id": 9,
            "date_modified_gmt": "2024-03-01T10:00:09",
            "line_items": [{"quantity": "lots"}]
        }));

        let OrderEntry::Malformed(bad) = entry else {
            panic!("expected a malformed entry, got {:?}", entry);
        };
        assert_eq!(bad.id, Some(9));
        assert_eq!(bad.modified_at, Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 9).unwrap()));
        assert!(!bad.reason.is_empty());

        let good = OrderEntry::from_value(json!({"id": 10}));
        assert!(matches!(good, OrderEntry::Order(ref order) if order.id == 10));
        assert_eq!(good.id(), Some(10));
    }

    #[test]
    fn test_address_display() {
        let address = Address {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            address_1: "Main Street 1".to_string(),
            postcode: "10115".to_string(),
            city: "Berlin".to_string(),
            country: "DE".to_string(),
            ..Address::default()
        };
        assert_eq!(
            address.display().unwrap(),
            "Jane Doe\nMain Street 1\n10115 Berlin\nDE"
        );
        assert_eq!(Address::default().display(), None);
    }

    #[test]
    fn test_first_run_query_has_no_modified_after() {
        let settings = StoreSettings::default();
        let params = OrderQuery::incremental(&settings, None).to_params();
        assert_eq!(
            params,
            vec![
                ("per_page".to_string(), "10".to_string()),
                ("status".to_string(), "processing".to_string()),
                ("orderby".to_string(), "modified".to_string()),
                ("order".to_string(), "asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_incremental_query_params() {
        let settings = StoreSettings {
            order_per_page: 50,
            order_status_filters: vec!["processing".to_string(), "on-hold".to_string()],
            ..StoreSettings::default()
        };
        let cursor = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let params = OrderQuery::incremental(&settings, Some(cursor)).to_params();

        assert!(params.contains(&("per_page".to_string(), "50".to_string())));
        assert!(params.contains(&("modified_after".to_string(), "2024-03-01T12:30:00".to_string())));
        assert!(params.contains(&("dates_are_gmt".to_string(), "true".to_string())));
        assert!(params.contains(&("status".to_string(), "processing,on-hold".to_string())));
    }

    #[test]
    fn test_product_batch_serialize() {
        let batch = ProductBatch {
            update: vec![StockUpdate { id: 42, stock_quantity: 7, manage_stock: true }],
        };
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({"update": [{"id": 42, "stock_quantity": 7, "manage_stock": true}]})
        );
    }
}
