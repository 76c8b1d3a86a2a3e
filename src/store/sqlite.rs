// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::settings::{CursorField, StoreSettings, SyncSettings};
use crate::store::models::{ErrorLogEntry, InventoryRecord, Item, LocalSalesOrder, SalesOrderLine};
use crate::store::traits::RecordStore;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sync_settings (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        settings_json TEXT NOT NULL,
        last_stock_sync TEXT,
        last_order_sync TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items (
        item_code TEXT PRIMARY KEY,
        item_name TEXT NOT NULL,
        remote_product_id INTEGER
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_items_remote_product ON items (remote_product_id)",
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        item_code TEXT NOT NULL,
        warehouse TEXT NOT NULL,
        actual_qty REAL NOT NULL,
        modified TEXT NOT NULL,
        PRIMARY KEY (item_code, warehouse)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales_orders (
        name TEXT PRIMARY KEY,
        remote_order_id INTEGER NOT NULL UNIQUE,
        customer TEXT NOT NULL,
        customer_email TEXT,
        transaction_date TEXT NOT NULL,
        currency TEXT NOT NULL,
        grand_total REAL NOT NULL,
        shipping_address TEXT,
        owner TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales_order_items (
        parent TEXT NOT NULL,
        idx INTEGER NOT NULL,
        item_code TEXT NOT NULL,
        remote_product_id INTEGER NOT NULL,
        qty REAL NOT NULL,
        rate REAL NOT NULL,
        amount REAL NOT NULL,
        PRIMARY KEY (parent, idx)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS error_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn decode_optional_ts(raw: Option<String>) -> anyhow::Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(decode_ts).transpose()
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Single-connection in-memory database; the data lives as long as the store.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }

        info!("Initialized SQLite record store schema");
        Ok(())
    }

    fn inventory_from_row(row: &SqliteRow) -> anyhow::Result<InventoryRecord> {
        Ok(InventoryRecord {
            item_code: row.try_get("item_code")?,
            warehouse: row.try_get("warehouse")?,
            actual_qty: row.try_get("actual_qty")?,
            modified: decode_ts(&row.try_get::<String, _>("modified")?)?,
            remote_product_id: row
                .try_get::<Option<i64>, _>("remote_product_id")?
                .map(|v| v as u64),
        })
    }

    async fn sales_order_lines(&self, parent: &str) -> anyhow::Result<Vec<SalesOrderLine>> {
        let rows = sqlx::query(
            r#"
            SELECT item_code, remote_product_id, qty, rate, amount
            FROM sales_order_items
            WHERE parent = ?1
            ORDER BY idx
            "#,
        )
        .bind(parent)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(SalesOrderLine {
                    item_code: row.try_get("item_code")?,
                    remote_product_id: row.try_get::<i64, _>("remote_product_id")? as u64,
                    qty: row.try_get("qty")?,
                    rate: row.try_get("rate")?,
                    amount: row.try_get("amount")?,
                })
            })
            .collect()
    }

    async fn sales_order_from_row(&self, row: &SqliteRow) -> anyhow::Result<LocalSalesOrder> {
        let name: String = row.try_get("name")?;
        let items = self.sales_order_lines(&name).await?;

        Ok(LocalSalesOrder {
            remote_order_id: row.try_get::<i64, _>("remote_order_id")? as u64,
            customer: row.try_get("customer")?,
            customer_email: row.try_get("customer_email")?,
            transaction_date: decode_ts(&row.try_get::<String, _>("transaction_date")?)?,
            currency: row.try_get("currency")?,
            grand_total: row.try_get("grand_total")?,
            shipping_address: row.try_get("shipping_address")?,
            owner: row.try_get("owner")?,
            created_at: decode_ts(&row.try_get::<String, _>("created_at")?)?,
            name,
            items,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load_settings(&self) -> anyhow::Result<SyncSettings> {
        let row = sqlx::query(
            "SELECT settings_json, last_stock_sync, last_order_sync FROM sync_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(SyncSettings::default());
        };

        let store: StoreSettings = serde_json::from_str(&row.try_get::<String, _>("settings_json")?)?;
        Ok(SyncSettings {
            store,
            last_stock_sync: decode_optional_ts(row.try_get("last_stock_sync")?)?,
            last_order_sync: decode_optional_ts(row.try_get("last_order_sync")?)?,
        })
    }

    async fn save_store_settings(&self, settings: &StoreSettings) -> anyhow::Result<()> {
        let json = serde_json::to_string(settings)?;
        sqlx::query(
            r#"
            INSERT INTO sync_settings (id, settings_json) VALUES (1, ?1)
            ON CONFLICT (id) DO UPDATE SET settings_json = excluded.settings_json
            "#,
        )
        .bind(json)
        .execute(&self.pool)
        .await?;

        info!("Saved sync settings");
        Ok(())
    }

    async fn set_cursor(&self, field: CursorField, value: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
        let column = field.column();
        // Encoded timestamps have a fixed width, so text order is time order
        let sql = format!(
            "INSERT INTO sync_settings (id, settings_json, {column}) VALUES (1, '{{}}', ?1) \
             ON CONFLICT (id) DO UPDATE SET {column} = excluded.{column} \
             WHERE sync_settings.{column} IS NULL OR sync_settings.{column} < excluded.{column}"
        );
        let result = sqlx::query(&sql)
            .bind(encode_ts(value))
            .execute(&self.pool)
            .await?;

        let stored: String = sqlx::query_scalar(&format!(
            "SELECT {column} FROM sync_settings WHERE id = 1"
        ))
        .fetch_one(&self.pool)
        .await?;
        let stored = decode_ts(&stored)?;

        if result.rows_affected() == 0 {
            debug!(cursor = column, value = %value, stored = %stored, "Cursor already further ahead, kept");
        } else {
            debug!(cursor = column, value = %value, "Updated sync cursor");
        }
        Ok(stored)
    }

    async fn upsert_item(&self, item: &Item) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO items (item_code, item_name, remote_product_id) VALUES (?1, ?2, ?3)
            ON CONFLICT (item_code) DO UPDATE
            SET item_name = excluded.item_name, remote_product_id = excluded.remote_product_id
            "#,
        )
        .bind(&item.item_code)
        .bind(&item.item_name)
        .bind(item.remote_product_id.map(|v| v as i64))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn item_for_remote_product(&self, remote_product_id: u64) -> anyhow::Result<Option<Item>> {
        let row = sqlx::query(
            "SELECT item_code, item_name, remote_product_id FROM items WHERE remote_product_id = ?1 LIMIT 1",
        )
        .bind(remote_product_id as i64)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Item {
                item_code: row.try_get("item_code")?,
                item_name: row.try_get("item_name")?,
                remote_product_id: row
                    .try_get::<Option<i64>, _>("remote_product_id")?
                    .map(|v| v as u64),
            })),
            None => Ok(None),
        }
    }

    async fn set_stock(
        &self,
        item_code: &str,
        warehouse: &str,
        actual_qty: f64,
        modified: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (item_code, warehouse, actual_qty, modified) VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (item_code, warehouse) DO UPDATE
            SET actual_qty = excluded.actual_qty, modified = excluded.modified
            "#,
        )
        .bind(item_code)
        .bind(warehouse)
        .bind(actual_qty)
        .bind(encode_ts(modified))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_inventory(
        &self,
        warehouse: &str,
        modified_since: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<InventoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT inv.item_code, inv.warehouse, inv.actual_qty, inv.modified, items.remote_product_id
            FROM inventory inv
            LEFT JOIN items ON items.item_code = inv.item_code
            WHERE inv.warehouse = ?1 AND (?2 IS NULL OR inv.modified >= ?2)
            ORDER BY inv.modified, inv.item_code
            "#,
        )
        .bind(warehouse)
        .bind(modified_since.map(encode_ts))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::inventory_from_row).collect()
    }

    async fn find_sales_order(&self, remote_order_id: u64) -> anyhow::Result<Option<LocalSalesOrder>> {
        let row = sqlx::query("SELECT * FROM sales_orders WHERE remote_order_id = ?1")
            .bind(remote_order_id as i64)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.sales_order_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn insert_sales_order(&self, order: &LocalSalesOrder) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sales_orders (
                name, remote_order_id, customer, customer_email, transaction_date,
                currency, grand_total, shipping_address, owner, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&order.name)
        .bind(order.remote_order_id as i64)
        .bind(&order.customer)
        .bind(&order.customer_email)
        .bind(encode_ts(order.transaction_date))
        .bind(&order.currency)
        .bind(order.grand_total)
        .bind(&order.shipping_address)
        .bind(&order.owner)
        .bind(encode_ts(order.created_at))
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            debug!(remote_order_id = order.remote_order_id, "Sales order already exists");
            return Ok(false);
        }

        for (idx, line) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sales_order_items (parent, idx, item_code, remote_product_id, qty, rate, amount)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&order.name)
            .bind(idx as i64)
            .bind(&line.item_code)
            .bind(line.remote_product_id as i64)
            .bind(line.qty)
            .bind(line.rate)
            .bind(line.amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(name = %order.name, remote_order_id = order.remote_order_id, "Inserted sales order");
        Ok(true)
    }

    async fn list_sales_orders(&self) -> anyhow::Result<Vec<LocalSalesOrder>> {
        let rows = sqlx::query("SELECT * FROM sales_orders ORDER BY remote_order_id")
            .fetch_all(&self.pool)
            .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.sales_order_from_row(&row).await?);
        }

        Ok(orders)
    }

    async fn record_error(&self, title: &str, message: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO error_log (title, message, created_at) VALUES (?1, ?2, ?3)")
            .bind(title)
            .bind(message)
            .bind(encode_ts(Utc::now()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_errors(&self) -> anyhow::Result<Vec<ErrorLogEntry>> {
        let rows = sqlx::query("SELECT title, message, created_at FROM error_log ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(ErrorLogEntry {
                    title: row.try_get("title")?,
                    message: row.try_get("message")?,
                    created_at: decode_ts(&row.try_get::<String, _>("created_at")?)?,
                })
            })
            .collect()
    }
}
