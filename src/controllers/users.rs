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
use crate::middleware::{not_blank, ValidatedJson};
use crate::models::{NewUser, UserStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct UsersQuery {
    q: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
struct UserRequest {
    #[validate(length(min = 1, max = 120), custom(function = "not_blank"))]
    name: String,
    #[validate(email)]
    email: String,
    status: UserStatus,
}

impl From<UserRequest> for NewUser {
    fn from(req: UserRequest) -> Self {
        NewUser { name: req.name.trim().to_string(), email: req.email, status: req.status }
    }
}

// GET /api/users?q=
async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let users = state.users.list_users(query).await?;
    Ok(Json(users))
}

// POST /api/users
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.insert_user(&req.into()).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users/{id}
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .update_user(id, &req.into())
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Json(user))
}

// DELETE /api/users/{id}
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.users.delete_user(id).await? {
        tracing::debug!(user_id = id, "delete of missing user ignored");
    }
    Ok(StatusCode::NO_CONTENT)
}
