// SPDX-License-Identifier: GPL-3.0-only
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use woo_sync::api::{ApiHandlers, HttpServer};
use woo_sync::config::{apply_setup, schedule_sync_jobs, Config};
use woo_sync::importer::{OrderImporter, SalesOrderImporter};
use woo_sync::logging::setup_logging;
use woo_sync::scheduler::{IntervalScheduler, JobScheduler};
use woo_sync::store::{RecordStore, SqliteStore};
use woo_sync::sync::{SyncOrchestrator, SyncService};
use woo_sync::webhook::WebhookProcessor;
use woo_sync::woocommerce::{RemoteStore, WooCommerceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_format)?;

    info!("Starting woo-sync-daemon v{}", env!("CARGO_PKG_VERSION"));

    // Initialize record store
    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::new(&config.database_path).await?);
    info!("Record store initialized at {}", config.database_path.display());

    // Validate and persist settings
    let settings = apply_setup(store.as_ref(), &config).await?;

    // Storefront client and flows
    let remote: Arc<dyn RemoteStore> = Arc::new(WooCommerceClient::new(
        &settings.store,
        Duration::from_secs(config.request_timeout_secs),
    )?);
    let importer: Arc<dyn OrderImporter> = Arc::new(SalesOrderImporter::new(Arc::clone(&store)));
    let sync: Arc<dyn SyncService> = Arc::new(SyncOrchestrator::new(
        Arc::clone(&store),
        remote,
        Arc::clone(&importer),
    ));

    // Schedule enabled flows
    let scheduler = IntervalScheduler::new();
    let jobs = schedule_sync_jobs(&scheduler, Arc::clone(&sync), &settings.store).await?;
    info!(count = jobs.len(), "Sync jobs scheduled");

    // Start HTTP server
    let webhooks = Arc::new(WebhookProcessor::new(Arc::clone(&store), importer));
    let handlers = ApiHandlers::new(Arc::clone(&store), sync, webhooks, config.admin_token.clone());
    let http_server = HttpServer::new(handlers, config.http_bind);
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    info!("Initiating graceful shutdown...");

    for job in jobs {
        scheduler.cancel(job).await;
    }
    http_task.abort();

    info!("Shutdown complete");
    Ok(())
}
