// SPDX-License-Identifier: GPL-3.0-only
pub mod config;
pub mod settings;
pub mod setup;

pub use config::{Config, LogFormat};
pub use settings::{CursorField, SettingsError, StoreSettings, SyncFrequency, SyncSettings, WebhookEndpoint};
pub use setup::{apply_setup, generate_secret, schedule_sync_jobs, webhook_endpoints};
