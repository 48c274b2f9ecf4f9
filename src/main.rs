// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use auditrs::config::settings::Settings;
use auditrs::domain::repositories::storage_repository::StorageRepository;
use auditrs::domain::services::llm_service::{LLMService, LLMServiceTrait};
use auditrs::infrastructure::backends::create_scan_backend;
use auditrs::infrastructure::database::connection;
use auditrs::infrastructure::repositories::pdf_report_repo_impl::PdfReportRepositoryImpl;
use auditrs::infrastructure::repositories::shared_estimate_repo_impl::SharedEstimateRepositoryImpl;
use auditrs::infrastructure::storage::LocalStorage;
use auditrs::presentation::routes;
use auditrs::presentation::state::AppState;
use auditrs::utils::telemetry;
use auditrs::workers::ExpirationWorker;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting auditrs...");

    // Initialize Prometheus Metrics
    let metrics = auditrs::infrastructure::metrics::init_metrics();

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Connect to database
    let db = Arc::new(connection::create_pool(&settings.database).await?);
    info!("Database connection established");

    info!("Running database migrations...");
    Migrator::up(db.as_ref(), None).await?;
    info!("Database migrations applied");

    // 4. External components
    let storage: Arc<dyn StorageRepository> = Arc::new(LocalStorage::from_settings(&settings.storage));
    let backend = create_scan_backend(&settings);
    info!(backend = backend.name(), "Scan backend initialized");

    let llm_service = LLMService::new_with_config(
        settings.llm.api_key.clone(),
        settings.llm.model.clone(),
        settings.llm.base_url.clone(),
    );
    if !llm_service.is_configured() {
        warn!("LLM API key not set, audit summaries are disabled");
    }
    let llm: Arc<dyn LLMServiceTrait> = Arc::new(llm_service);

    let state = AppState::new(&settings, db.clone(), backend, storage.clone(), llm, metrics);

    // 5. Resume scans left running by a previous process
    let resumed = state.tracker.resume_unfinished().await?;
    if resumed > 0 {
        info!(count = resumed, "Resumed tracking of unfinished scans");
    }

    // 6. Start workers
    let expiration_worker = ExpirationWorker::new(
        Arc::new(SharedEstimateRepositoryImpl::new(db.clone())),
        Arc::new(PdfReportRepositoryImpl::new(db.clone())),
        storage,
        Duration::from_secs(settings.sharing.cleanup_interval_secs.max(1)),
    );
    let worker_shutdown = expiration_worker.shutdown_token();
    let worker_handle = expiration_worker.start();

    // 7. Start HTTP server
    let tracker = state.tracker.clone();
    let app = routes::routes(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    tracker.shutdown();
    worker_shutdown.cancel();
    if let Err(e) = worker_handle.await {
        warn!("Expiration worker did not stop cleanly: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
