use async_trait::async_trait;

use super::{AuditStore, LogStore, SeatStore, StoreError, StoreResult, UserStore};
use crate::database::Database;
use crate::models::{MaintenanceAudit, NewUser, ReservationLog, Seat, SeatRow, SeatStatus, User, UserRow};

const SEAT_COLUMNS: &str = "id, number, status";
const USER_COLUMNS: &str = "id, name, email, status";

/// Хранилище поверх пула Postgres. Соединение берется из пула на каждый
/// запрос и возвращается в пул сразу после него.
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn to_seat(row: SeatRow) -> StoreResult<Seat> {
    Seat::try_from(row).map_err(|e| StoreError::Corrupt(e.to_string()))
}

fn to_user(row: UserRow) -> StoreResult<User> {
    User::try_from(row).map_err(StoreError::Corrupt)
}

#[async_trait]
impl SeatStore for PgStore {
    async fn list_seats(&self) -> StoreResult<Vec<Seat>> {
        let sql = format!("SELECT {SEAT_COLUMNS} FROM seats ORDER BY id DESC");
        let rows = sqlx::query_as::<_, SeatRow>(&sql)
            .fetch_all(&self.db.pool)
            .await?;
        rows.into_iter().map(to_seat).collect()
    }

    async fn find_seat(&self, id: i64) -> StoreResult<Option<Seat>> {
        let sql = format!("SELECT {SEAT_COLUMNS} FROM seats WHERE id = $1");
        let row = sqlx::query_as::<_, SeatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?;
        row.map(to_seat).transpose()
    }

    async fn insert_seat(&self, number: &str, status: SeatStatus) -> StoreResult<Seat> {
        let sql = format!("INSERT INTO seats (number, status) VALUES ($1, $2) RETURNING {SEAT_COLUMNS}");
        let row = sqlx::query_as::<_, SeatRow>(&sql)
            .bind(number)
            .bind(status.as_str())
            .fetch_one(&self.db.pool)
            .await?;
        to_seat(row)
    }

    async fn transition_seat(&self, id: i64, from: SeatStatus, to: SeatStatus) -> StoreResult<Option<Seat>> {
        // Проверка и запись одним UPDATE: две гонки не увидят один и тот же FROM
        let sql = format!(
            "UPDATE seats SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {SEAT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SeatRow>(&sql)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&self.db.pool)
            .await?;
        row.map(to_seat).transpose()
    }

    async fn overwrite_seat(&self, id: i64, number: &str, status: SeatStatus) -> StoreResult<Option<Seat>> {
        let sql = format!(
            "UPDATE seats SET number = $2, status = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {SEAT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SeatRow>(&sql)
            .bind(id)
            .bind(number)
            .bind(status.as_str())
            .fetch_optional(&self.db.pool)
            .await?;
        row.map(to_seat).transpose()
    }

    async fn delete_seat(&self, id: i64, keep_if: Option<SeatStatus>) -> StoreResult<bool> {
        let deleted = sqlx::query_scalar::<_, i64>(
            "DELETE FROM seats WHERE id = $1 AND ($2::TEXT IS NULL OR status <> $2::TEXT) RETURNING id"
        )
        .bind(id)
        .bind(keep_if.map(|s| s.as_str()))
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(deleted.is_some())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn list_users(&self, query: Option<&str>) -> StoreResult<Vec<User>> {
        let rows = match query {
            Some(q) => {
                let sql = format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE name ILIKE $1 OR email ILIKE $1 ORDER BY id DESC"
                );
                sqlx::query_as::<_, UserRow>(&sql)
                    .bind(format!("%{q}%"))
                    .fetch_all(&self.db.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id DESC");
                sqlx::query_as::<_, UserRow>(&sql)
                    .fetch_all(&self.db.pool)
                    .await?
            }
        };
        rows.into_iter().map(to_user).collect()
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let sql = format!("INSERT INTO users (name, email, status) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .fetch_one(&self.db.pool)
            .await?;
        to_user(row)
    }

    async fn update_user(&self, id: i64, user: &NewUser) -> StoreResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, status = $4 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(user.status.as_str())
            .fetch_optional(&self.db.pool)
            .await?;
        row.map(to_user).transpose()
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LogStore for PgStore {
    async fn recent_logs(&self, limit: i64) -> StoreResult<Vec<ReservationLog>> {
        let logs = sqlx::query_as::<_, ReservationLog>(
            "SELECT id, message, created_at FROM reservation_logs ORDER BY id DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(logs)
    }

    async fn append_log(&self, message: &str) -> StoreResult<ReservationLog> {
        let log = sqlx::query_as::<_, ReservationLog>(
            "INSERT INTO reservation_logs (message) VALUES ($1) RETURNING id, message, created_at"
        )
        .bind(message)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(log)
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn record_audit(&self, action: &str, result: &str) -> StoreResult<MaintenanceAudit> {
        let audit = sqlx::query_as::<_, MaintenanceAudit>(
            "INSERT INTO maintenance_audit (action, result) VALUES ($1, $2) \
             RETURNING id, action, result, created_at"
        )
        .bind(action)
        .bind(result)
        .fetch_one(&self.db.pool)
        .await?;
        Ok(audit)
    }

    async fn recent_audit(&self, limit: i64) -> StoreResult<Vec<MaintenanceAudit>> {
        let rows = sqlx::query_as::<_, MaintenanceAudit>(
            "SELECT id, action, result, created_at FROM maintenance_audit ORDER BY id DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.db.pool)
        .await?;
        Ok(rows)
    }

    async fn last_audit(&self, action: &str) -> StoreResult<Option<MaintenanceAudit>> {
        let row = sqlx::query_as::<_, MaintenanceAudit>(
            "SELECT id, action, result, created_at FROM maintenance_audit \
             WHERE action = $1 ORDER BY id DESC LIMIT 1"
        )
        .bind(action)
        .fetch_optional(&self.db.pool)
        .await?;
        Ok(row)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.db.pool)
            .await?;
        Ok(())
    }
}
