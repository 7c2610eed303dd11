use axum::{
    extract::State,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::ValidatedJson;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/book", post(book_seat))
        .route("/cancel", post(cancel_booking))
}

#[derive(Debug, Deserialize, Validate)]
struct SeatIdRequest {
    // Неположительный id не отсекаем: для него ledger отвечает 404
    seat_id: i64,
}

// POST /api/book
async fn book_seat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SeatIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state.ledger.book(req.seat_id).await?;
    Ok(Json(serde_json::json!({ "message": confirmation.message })))
}

// POST /api/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<SeatIdRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state.ledger.cancel(req.seat_id).await?;
    Ok(Json(serde_json::json!({ "message": confirmation.message })))
}
