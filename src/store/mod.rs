//! Слой доступа к данным.
//!
//! Каждая сущность описана своим трейтом; `PgStore` реализует их поверх
//! Postgres, `MemoryStore` в памяти процесса. Сервисы получают хранилище
//! через `Arc<dyn ...>` и не знают, какое из них под ними.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{MaintenanceAudit, NewUser, ReservationLog, Seat, SeatStatus, User};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Нарушено ограничение уникальности (например, seats.number).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// Пул не выдал соединение: запрос до сервера не дошел, повтор безопасен.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Обрыв соединения во время запроса. Результат неизвестен: запись
    /// могла быть зафиксирована.
    #[error("transient storage failure: {0}")]
    Transient(String),

    #[error("storage failure: {0}")]
    Database(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Transient(_))
    }

    /// Запрос точно не выполнялся, поэтому его можно повторить даже для записи.
    pub fn is_unsent(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::PoolTimedOut => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Io(_) => StoreError::Transient(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SeatStore: Send + Sync {
    /// Все места, новые первыми (id по убыванию).
    async fn list_seats(&self) -> StoreResult<Vec<Seat>>;

    async fn find_seat(&self, id: i64) -> StoreResult<Option<Seat>>;

    async fn insert_seat(&self, number: &str, status: SeatStatus) -> StoreResult<Seat>;

    /// Атомарный переход `from -> to`. `None`, если места нет или его статус
    /// не равен `from`; в этом случае строка не меняется.
    async fn transition_seat(&self, id: i64, from: SeatStatus, to: SeatStatus) -> StoreResult<Option<Seat>>;

    /// Безусловная перезапись номера и статуса.
    async fn overwrite_seat(&self, id: i64, number: &str, status: SeatStatus) -> StoreResult<Option<Seat>>;

    /// Удаляет место, если его статус не равен `keep_if`. `true`, если строка удалена.
    async fn delete_seat(&self, id: i64, keep_if: Option<SeatStatus>) -> StoreResult<bool>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self, query: Option<&str>) -> StoreResult<Vec<User>>;
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i64, user: &NewUser) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;
}

#[async_trait]
pub trait LogStore: Send + Sync {
    async fn recent_logs(&self, limit: i64) -> StoreResult<Vec<ReservationLog>>;
    async fn append_log(&self, message: &str) -> StoreResult<ReservationLog>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn record_audit(&self, action: &str, result: &str) -> StoreResult<MaintenanceAudit>;
    async fn recent_audit(&self, limit: i64) -> StoreResult<Vec<MaintenanceAudit>>;
    async fn last_audit(&self, action: &str) -> StoreResult<Option<MaintenanceAudit>>;
    /// Проверка доступности хранилища (`SELECT 1`).
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_is_unsent_but_io_is_not() {
        let timeout = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(timeout.is_transient());
        assert!(timeout.is_unsent());

        let io = StoreError::from(sqlx::Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionReset)));
        assert!(io.is_transient());
        assert!(!io.is_unsent());

        assert!(!StoreError::Database("syntax".into()).is_transient());
    }
}
