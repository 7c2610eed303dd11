use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{not_blank, ValidatedJson};
use crate::AppState;

const RECENT_LOGS: i64 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/logs", get(list_logs).post(create_log))
}

// GET /api/logs - последние 100 записей
async fn list_logs(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = state.logs.recent_logs(RECENT_LOGS).await?;
    Ok(Json(logs))
}

#[derive(Debug, Deserialize, Validate)]
struct LogRequest {
    #[validate(length(min = 1, max = 1000), custom(function = "not_blank"))]
    message: String,
}

// POST /api/logs
async fn create_log(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<LogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let log = state.logs.append_log(req.message.trim()).await?;
    Ok((StatusCode::CREATED, Json(log)))
}
