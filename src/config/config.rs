// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::settings::StoreSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Unknown log format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database path for the local record store
    pub database_path: PathBuf,

    /// Bind address for webhooks and the sync API (e.g., "127.0.0.1:8080")
    pub http_bind: SocketAddr,

    /// Externally reachable base URL of this daemon, used to build webhook URLs
    pub public_base_url: String,

    /// Bearer token that grants write permission on the on-demand sync endpoints
    pub admin_token: Option<String>,

    /// Per-request timeout for storefront calls in seconds
    pub request_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_format: LogFormat,

    /// Storefront connection and sync settings
    pub woocommerce: StoreSettings,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`] with a custom variable lookup.
    pub fn load_with<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = lookup("WOO_SYNC_CONFIG").unwrap_or_else(|| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        if let Some(val) = lookup("WOO_SYNC_DATABASE_PATH") {
            config.database_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("WOO_SYNC_HTTP_BIND") {
            config.http_bind = SocketAddr::from_str(&val)?;
        }
        if let Some(val) = lookup("WOO_SYNC_PUBLIC_BASE_URL") {
            config.public_base_url = val;
        }
        if let Some(val) = lookup("WOO_SYNC_ADMIN_TOKEN") {
            config.admin_token = Some(val);
        }
        if let Some(val) = lookup("WOO_SYNC_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = val.parse()?;
        }
        if let Some(val) = lookup("WOO_SYNC_LOG_LEVEL") {
            config.log_level = val;
        }
        if let Some(val) = lookup("WOO_SYNC_LOG_FORMAT") {
            config.log_format = val.parse()?;
        }

        // Storefront secrets are usually kept out of the config file
        if let Some(val) = lookup("WOO_SYNC_STORE_URL") {
            config.woocommerce.store_url = val;
        }
        if let Some(val) = lookup("WOO_SYNC_CONSUMER_KEY") {
            config.woocommerce.consumer_key = val;
        }
        if let Some(val) = lookup("WOO_SYNC_CONSUMER_SECRET") {
            config.woocommerce.consumer_secret = val;
        }
        if let Some(val) = lookup("WOO_SYNC_WEBHOOK_SECRET") {
            config.woocommerce.webhook_secret = val;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("woo-sync.db"),
            http_bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            public_base_url: String::from("http://localhost:8080"),
            admin_token: None,
            request_timeout_secs: 1000,
            log_level: String::from("info"),
            log_format: LogFormat::Pretty,
            woocommerce: StoreSettings::default(),
        }
    }
}
