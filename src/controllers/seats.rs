use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::models::{SeatResponse, SeatStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(list_seats).post(create_seat))
        .route("/seats/{id}", put(update_seat).delete(delete_seat))
}

/* ---------- SEATS ---------- */

// GET /api/seats
async fn list_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let seats = state.ledger.list_seats().await?;
    let payload: Vec<SeatResponse> = seats.into_iter().map(SeatResponse::from).collect();
    Ok(Json(payload))
}

// POST /api/seats
#[derive(Debug, Deserialize, Validate)]
struct CreateSeatRequest {
    #[validate(length(min = 1, max = 32))]
    number: String,
    status: Option<SeatStatus>,
}

async fn create_seat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateSeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = req.status.unwrap_or(SeatStatus::Available);
    let seat = state.ledger.create_seat(&req.number, status).await?;
    Ok((StatusCode::CREATED, Json(SeatResponse::from(seat))))
}

// PUT /api/seats/{id}
// Административная правка: статус ставится напрямую, без правил брони
#[derive(Debug, Deserialize, Validate)]
struct UpdateSeatRequest {
    #[validate(length(min = 1, max = 32))]
    number: String,
    status: SeatStatus,
}

async fn update_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateSeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let seat = state.ledger.update_seat(id, &req.number, req.status).await?;
    Ok(Json(SeatResponse::from(seat)))
}

// DELETE /api/seats/{id}?force=true
#[derive(Debug, Deserialize)]
struct DeleteSeatQuery {
    #[serde(default)]
    force: bool,
}

async fn delete_seat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<DeleteSeatQuery>,
) -> Result<impl IntoResponse, ApiError> {
    state.ledger.delete_seat(id, params.force).await?;
    Ok(StatusCode::NO_CONTENT)
}
