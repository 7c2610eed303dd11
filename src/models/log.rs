use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use sqlx::FromRow;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_timestamp<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ReservationLog {
    pub id: i64,
    pub message: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
}

/// Запись аудита обслуживания (backup / clear_cache / diagnostics).
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct MaintenanceAudit {
    pub id: i64,
    pub action: String,
    pub result: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
}
