// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound for minute-based sync intervals.
pub const MAX_INTERVAL_MINUTES: u32 = 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Interval in minutes cannot be greater than 60 minutes: {field} = {value}")]
    IntervalTooLarge { field: &'static str, value: u32 },

    #[error("Interval in minutes must be at least 1: {field}")]
    IntervalZero { field: &'static str },

    #[error("Storefront URL is required when a sync flow is enabled")]
    MissingStoreUrl,

    #[error("Warehouse is required when stock sync is enabled")]
    MissingWarehouse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncFrequency {
    #[default]
    Minutes,
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEndpoint {
    /// Storefront topic, e.g. `order.created`
    pub topic: String,
    /// Delivery URL to register on the storefront
    pub url: String,
}

/// Administrator-owned part of the settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Storefront base URL, e.g. `https://shop.example.com`
    pub store_url: String,

    pub consumer_key: String,

    pub consumer_secret: String,

    /// Verify the storefront's TLS certificate
    pub verify_ssl: bool,

    /// Shared secret for webhook signatures
    pub webhook_secret: String,

    /// Identity that webhook-originated and scheduled writes are attributed to
    pub default_identity: String,

    pub enable_stock_sync: bool,

    /// Stock sync interval in minutes
    pub stock_sync_interval: u32,

    /// Warehouse whose stock is pushed to the storefront
    pub warehouse: String,

    pub enable_order_sync: bool,

    pub order_sync_frequency: SyncFrequency,

    /// Order sync interval in minutes, used with `SyncFrequency::Minutes`
    pub order_sync_interval: u32,

    /// Storefront order statuses to pull, e.g. `["processing"]`
    pub order_status_filters: Vec<String>,

    /// Orders per page requested from the storefront
    pub order_per_page: u32,

    /// Naming series prefix for imported sales orders
    pub sales_order_series: String,

    /// Webhook delivery URLs, filled in by setup
    pub webhook_endpoints: Vec<WebhookEndpoint>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_url: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            verify_ssl: true,
            webhook_secret: String::new(),
            default_identity: String::from("Administrator"),
            enable_stock_sync: false,
            stock_sync_interval: 15,
            warehouse: String::new(),
            enable_order_sync: false,
            order_sync_frequency: SyncFrequency::Minutes,
            order_sync_interval: 15,
            order_status_filters: vec![String::from("processing")],
            order_per_page: 10,
            sales_order_series: String::from("SO-WOO-"),
            webhook_endpoints: Vec::new(),
        }
    }
}

impl StoreSettings {
    /// Reject interval combinations the scheduler cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.enable_stock_sync {
            check_minutes("stock_sync_interval", self.stock_sync_interval)?;
            if self.warehouse.trim().is_empty() {
                return Err(SettingsError::MissingWarehouse);
            }
        }

        if self.enable_order_sync && self.order_sync_frequency == SyncFrequency::Minutes {
            check_minutes("order_sync_interval", self.order_sync_interval)?;
        }

        if (self.enable_stock_sync || self.enable_order_sync) && self.store_url.trim().is_empty() {
            return Err(SettingsError::MissingStoreUrl);
        }

        Ok(())
    }

    /// Page size sent to the storefront; zero falls back to 10.
    pub fn page_size(&self) -> u32 {
        if self.order_per_page == 0 { 10 } else { self.order_per_page }
    }
}

fn check_minutes(field: &'static str, value: u32) -> Result<(), SettingsError> {
    if value == 0 {
        return Err(SettingsError::IntervalZero { field });
    }
    if value > MAX_INTERVAL_MINUTES {
        return Err(SettingsError::IntervalTooLarge { field, value });
    }
    Ok(())
}

/// The persisted settings record: admin settings plus the two sync cursors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub store: StoreSettings,
    pub last_stock_sync: Option<DateTime<Utc>>,
    pub last_order_sync: Option<DateTime<Utc>>,
}

/// Which cursor a flow owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorField {
    Stock,
    Order,
}

impl CursorField {
    pub fn column(self) -> &'static str {
        match self {
            CursorField::Stock => "last_stock_sync",
            CursorField::Order => "last_order_sync",
        }
    }

    pub fn read(self, settings: &SyncSettings) -> Option<DateTime<Utc>> {
        match self {
            CursorField::Stock => settings.last_stock_sync,
            CursorField::Order => settings.last_order_sync,
        }
    }
}
