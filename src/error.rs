use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::LedgerError;
use crate::store::StoreError;

/// Ошибка HTTP-слоя. Тело ответа всегда `{"detail": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    /// Временная недоступность хранилища; клиент может повторить запрос.
    #[error("storage temporarily unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) | StoreError::Transient(msg) => ApiError::Unavailable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::SeatNotFound => ApiError::NotFound(message),
            LedgerError::InvalidNumber => ApiError::Validation(message),
            LedgerError::SeatBooked(_) => ApiError::Conflict(message),
            LedgerError::DuplicateSeat(_)
            | LedgerError::AlreadyBooked
            | LedgerError::NotBooked
            | LedgerError::UnderMaintenance => ApiError::BadRequest(message),
            LedgerError::Store(store) => store.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Детали сбоев хранилища остаются в логах, наружу уходит общий текст
        let detail = match &self {
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                "Internal server error".to_string()
            }
            ApiError::Unavailable(msg) => {
                tracing::warn!("storage unavailable: {}", msg);
                "Storage temporarily unavailable, please retry.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_errors_map_to_client_statuses() {
        let cases = [
            (LedgerError::SeatNotFound, StatusCode::NOT_FOUND),
            (LedgerError::AlreadyBooked, StatusCode::BAD_REQUEST),
            (LedgerError::NotBooked, StatusCode::BAD_REQUEST),
            (LedgerError::UnderMaintenance, StatusCode::BAD_REQUEST),
            (LedgerError::DuplicateSeat("1A".into()), StatusCode::BAD_REQUEST),
            (LedgerError::SeatBooked("1A".into()), StatusCode::CONFLICT),
            (LedgerError::InvalidNumber, StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn transient_store_errors_are_retryable_server_errors() {
        let err = ApiError::from(LedgerError::Store(StoreError::Transient("io".into())));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(StoreError::Unavailable("pool timed out".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(StoreError::Database("syntax".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
