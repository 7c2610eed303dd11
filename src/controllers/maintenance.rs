//! maintenance.rs
//!
//! Симуляция обслуживания для дашборда: backup, clear-cache, diagnostics.
//! Каждое действие только пишет строку аудита. Здесь же отчет о
//! состоянии системы.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::MaintenanceAction;
use crate::AppState;

const RECENT_AUDIT: i64 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/maintenance/backup", post(backup))
        .route("/maintenance/clear-cache", post(clear_cache))
        .route("/maintenance/diagnostics", post(diagnostics))
        .route("/maintenance/audit", get(list_audit))
        .route("/system/health", get(system_health))
}

async fn run(state: &AppState, action: MaintenanceAction) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.maintenance.run(action).await?;
    Ok(Json(outcome))
}

// POST /api/maintenance/backup
async fn backup(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    run(&state, MaintenanceAction::Backup).await
}

// POST /api/maintenance/clear-cache
async fn clear_cache(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    run(&state, MaintenanceAction::ClearCache).await
}

// POST /api/maintenance/diagnostics
async fn diagnostics(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    run(&state, MaintenanceAction::Diagnostics).await
}

// GET /api/maintenance/audit
async fn list_audit(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.maintenance.recent(RECENT_AUDIT).await?;
    Ok(Json(rows))
}

// GET /api/system/health
async fn system_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.maintenance.health().await)
}
