pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use services::{MaintenanceService, RetryPolicy, SeatLedger};
use store::{AuditStore, LogStore, MemoryStore, PgStore, SeatStore, UserStore};

// Shared state для всего приложения. Хранилища передаются явно,
// глобального соединения нет.
#[derive(Clone)]
pub struct AppState {
    pub ledger: SeatLedger,
    pub users: Arc<dyn UserStore>,
    pub logs: Arc<dyn LogStore>,
    pub maintenance: MaintenanceService,
    pub config: config::Config,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        if config.database.is_memory() {
            info!("Using in-memory storage");
            return Ok(Self::with_store(Arc::new(MemoryStore::new()), config));
        }

        let db = database::Database::new(&config.database).await?;
        info!("Database connected");

        db.run_migrations().await?;

        Ok(Self::with_store(Arc::new(PgStore::new(db)), config))
    }

    /// Собирает состояние поверх одного хранилища, реализующего все трейты.
    pub fn with_store<S>(store: Arc<S>, config: config::Config) -> Arc<Self>
    where
        S: SeatStore + UserStore + LogStore + AuditStore + 'static,
    {
        let seats: Arc<dyn SeatStore> = store.clone();
        let audit: Arc<dyn AuditStore> = store.clone();
        Arc::new(Self {
            ledger: SeatLedger::new(seats, RetryPolicy::from_config(&config.database)),
            users: store.clone(),
            logs: store,
            maintenance: MaintenanceService::new(audit),
            config,
        })
    }
}

/// Главный роутер: API под `/api`, плюс корень и `/health`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "SmartSeat API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
