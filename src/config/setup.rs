// SPDX-License-Identifier: GPL-3.0-only
use futures_util::FutureExt;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::config::config::Config;
use crate::config::settings::{StoreSettings, SyncSettings, WebhookEndpoint};
use crate::context::OperationContext;
use crate::scheduler::{JobHandle, JobScheduler, ScheduledJob, SyncSchedule};
use crate::store::traits::RecordStore;
use crate::sync::traits::SyncService;
use crate::webhook::service::WebhookAction;

/// Route prefix the webhook endpoints are served under.
pub const WEBHOOK_ROUTE_PREFIX: &str = "api/webhooks/";

/// Random webhook secret, 32 hex characters.
pub fn generate_secret() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Delivery URLs to register on the storefront, one per subscribed topic.
pub fn webhook_endpoints(public_base_url: &str) -> Result<Vec<WebhookEndpoint>, url::ParseError> {
    let base = Url::parse(&format!("{}/", public_base_url.trim().trim_end_matches('/')))?;

    WebhookAction::ALL
        .iter()
        .map(|action| {
            let url = base.join(WEBHOOK_ROUTE_PREFIX)?.join(action.path())?;
            Ok(WebhookEndpoint {
                topic: action.topic().to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

/// Validate the configured settings, fill in what setup owns and persist them.
///
/// Cursors already in the store are kept. A webhook secret stored by an
/// earlier run is reused so the storefront keeps signing with a known key.
pub async fn apply_setup(store: &dyn RecordStore, config: &Config) -> anyhow::Result<SyncSettings> {
    let mut settings: StoreSettings = config.woocommerce.clone();
    settings.validate()?;

    if settings.webhook_secret.is_empty() {
        let existing = store.load_settings().await?.store.webhook_secret;
        if existing.is_empty() {
            info!("No webhook secret configured, generated a new one");
            settings.webhook_secret = generate_secret();
        } else {
            settings.webhook_secret = existing;
        }
    }

    if settings.webhook_endpoints.is_empty() {
        settings.webhook_endpoints = webhook_endpoints(&config.public_base_url)?;
    }

    store.save_store_settings(&settings).await?;

    for endpoint in &settings.webhook_endpoints {
        info!(topic = %endpoint.topic, url = %endpoint.url, "Webhook endpoint");
    }

    store.load_settings().await
}

/// Schedule the enabled sync flows, acting as the default identity.
pub async fn schedule_sync_jobs(
    scheduler: &dyn JobScheduler,
    sync: Arc<dyn SyncService>,
    settings: &StoreSettings,
) -> anyhow::Result<Vec<JobHandle>> {
    let ctx = OperationContext::default_identity(settings);
    let mut handles = Vec::new();

    if settings.enable_stock_sync {
        let sync = Arc::clone(&sync);
        let ctx = ctx.clone();
        let job = ScheduledJob {
            name: "stock-sync".to_string(),
            schedule: SyncSchedule::for_stock(settings),
            run: Arc::new(move || {
                let sync = Arc::clone(&sync);
                let ctx = ctx.clone();
                async move {
                    match sync.sync_stock(&ctx).await {
                        Ok(outcome) => info!(?outcome, "Scheduled stock sync finished"),
                        Err(e) => error!(error = %e, "Scheduled stock sync failed"),
                    }
                }
                .boxed()
            }),
        };
        handles.push(scheduler.schedule(job).await?);
    }

    if settings.enable_order_sync {
        let sync = Arc::clone(&sync);
        let job = ScheduledJob {
            name: "order-sync".to_string(),
            schedule: SyncSchedule::for_orders(settings),
            run: Arc::new(move || {
                let sync = Arc::clone(&sync);
                let ctx = ctx.clone();
                async move {
                    match sync.sync_orders(&ctx).await {
                        Ok(outcome) => info!(?outcome, "Scheduled order sync finished"),
                        Err(e) => error!(error = %e, "Scheduled order sync failed"),
                    }
                }
                .boxed()
            }),
        };
        handles.push(scheduler.schedule(job).await?);
    }

    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{CursorField, SettingsError, SyncFrequency};
    use crate::sync::traits::{OrderSyncOutcome, StockSyncOutcome};
    use crate::test_helpers::setup_test_store;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn config() -> Config {
        Config {
            public_base_url: "https://erp.example.com/".to_string(),
            woocommerce: StoreSettings {
                store_url: "https://shop.example.com".to_string(),
                warehouse: "Stores - WH".to_string(),
                enable_stock_sync: true,
                enable_order_sync: true,
                ..StoreSettings::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_generate_secret_is_random_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_webhook_endpoints() {
        let endpoints = webhook_endpoints("https://erp.example.com/erp").unwrap();
        assert_eq!(
            endpoints,
            vec![
                WebhookEndpoint {
                    topic: "order.created".to_string(),
                    url: "https://erp.example.com/erp/api/webhooks/order-created".to_string(),
                },
                WebhookEndpoint {
                    topic: "order.updated".to_string(),
                    url: "https://erp.example.com/erp/api/webhooks/order-updated".to_string(),
                },
            ]
        );
        assert!(webhook_endpoints("not a url").is_err());
    }

    #[tokio::test]
    async fn test_apply_setup_fills_secret_and_endpoints() {
        let store = setup_test_store().await;
        let settings = apply_setup(store.as_ref(), &config()).await.unwrap();

        assert_eq!(settings.store.webhook_secret.len(), 32);
        assert_eq!(settings.store.webhook_endpoints.len(), 2);
        assert_eq!(
            settings.store.webhook_endpoints[0].url,
            "https://erp.example.com/api/webhooks/order-created"
        );
    }

    #[tokio::test]
    async fn test_apply_setup_reuses_secret_and_keeps_cursors() {
        let store = setup_test_store().await;
        let first = apply_setup(store.as_ref(), &config()).await.unwrap();

        let cursor = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        store.set_cursor(CursorField::Order, cursor).await.unwrap();

        let second = apply_setup(store.as_ref(), &config()).await.unwrap();
        assert_eq!(second.store.webhook_secret, first.store.webhook_secret);
        assert_eq!(second.last_order_sync, Some(cursor));
    }

    #[tokio::test]
    async fn test_apply_setup_keeps_configured_secret() {
        let store = setup_test_store().await;
        let mut config = config();
        config.woocommerce.webhook_secret = "whsec_configured".to_string();

        let settings = apply_setup(store.as_ref(), &config).await.unwrap();
        assert_eq!(settings.store.webhook_secret, "whsec_configured");
    }

    #[tokio::test]
    async fn test_apply_setup_rejects_invalid_interval() {
        let store = setup_test_store().await;
        let mut config = config();
        config.woocommerce.stock_sync_interval = 61;

        let err = apply_setup(store.as_ref(), &config).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<SettingsError>(),
            Some(&SettingsError::IntervalTooLarge { field: "stock_sync_interval", value: 61 })
        );
        assert_eq!(store.load_settings().await.unwrap(), SyncSettings::default());
    }

    #[derive(Default)]
    struct RecordingScheduler {
        jobs: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl JobScheduler for RecordingScheduler {
        async fn schedule(&self, job: ScheduledJob) -> anyhow::Result<JobHandle> {
            self.jobs
                .lock()
                .unwrap()
                .push((job.name.clone(), job.schedule.cron_expression()));
            Ok(JobHandle::new())
        }

        async fn cancel(&self, _handle: JobHandle) -> bool {
            false
        }
    }

    struct IdleSync;

    #[async_trait]
    impl SyncService for IdleSync {
        async fn sync_stock(&self, _ctx: &OperationContext) -> anyhow::Result<StockSyncOutcome> {
            Ok(StockSyncOutcome::Disabled)
        }

        async fn sync_orders(&self, _ctx: &OperationContext) -> anyhow::Result<OrderSyncOutcome> {
            Ok(OrderSyncOutcome::Disabled)
        }
    }

    #[tokio::test]
    async fn test_schedule_sync_jobs_for_enabled_flows() {
        let scheduler = RecordingScheduler::default();
        let settings = StoreSettings {
            stock_sync_interval: 10,
            order_sync_frequency: SyncFrequency::Hourly,
            ..config().woocommerce
        };

        let handles = schedule_sync_jobs(&scheduler, Arc::new(IdleSync), &settings)
            .await
            .unwrap();

        assert_eq!(handles.len(), 2);
        assert_eq!(
            *scheduler.jobs.lock().unwrap(),
            vec![
                ("stock-sync".to_string(), "0/10 * * * *".to_string()),
                ("order-sync".to_string(), "hourly".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_schedule_sync_jobs_skips_disabled_flows() {
        let scheduler = RecordingScheduler::default();
        let settings = StoreSettings {
            enable_stock_sync: false,
            ..config().woocommerce
        };

        let handles = schedule_sync_jobs(&scheduler, Arc::new(IdleSync), &settings)
            .await
            .unwrap();

        assert_eq!(handles.len(), 1);
        assert_eq!(scheduler.jobs.lock().unwrap()[0].0, "order-sync");
    }
}
