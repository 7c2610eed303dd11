use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{AuditStore, LogStore, SeatStore, StoreError, StoreResult, UserStore};
use crate::models::{MaintenanceAudit, NewUser, ReservationLog, Seat, SeatStatus, User};

#[derive(Default)]
struct Tables {
    seats: BTreeMap<i64, Seat>,
    users: BTreeMap<i64, User>,
    logs: BTreeMap<i64, ReservationLog>,
    audit: BTreeMap<i64, MaintenanceAudit>,
    last_id: i64,
}

impl Tables {
    // Один счетчик на все таблицы: id уникальны и монотонны
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn number_taken(&self, number: &str, except: Option<i64>) -> bool {
        self.seats
            .values()
            .any(|s| s.number == number && Some(s.id) != except)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Хранилище в памяти процесса (`DATABASE_URL=memory://`). Все изменения
/// выполняются под одной блокировкой записи, так что условный переход
/// статуса атомарен так же, как UPDATE ... WHERE в Postgres.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SeatStore for MemoryStore {
    async fn list_seats(&self) -> StoreResult<Vec<Seat>> {
        let tables = self.tables.read().await;
        Ok(tables.seats.values().rev().cloned().collect())
    }

    async fn find_seat(&self, id: i64) -> StoreResult<Option<Seat>> {
        Ok(self.tables.read().await.seats.get(&id).cloned())
    }

    async fn insert_seat(&self, number: &str, status: SeatStatus) -> StoreResult<Seat> {
        let mut tables = self.tables.write().await;
        if tables.number_taken(number, None) {
            return Err(StoreError::UniqueViolation("seats_number_key".to_string()));
        }
        let seat = Seat { id: tables.next_id(), number: number.to_string(), status };
        tables.seats.insert(seat.id, seat.clone());
        Ok(seat)
    }

    async fn transition_seat(&self, id: i64, from: SeatStatus, to: SeatStatus) -> StoreResult<Option<Seat>> {
        let mut tables = self.tables.write().await;
        match tables.seats.get_mut(&id) {
            Some(seat) if seat.status == from => {
                seat.status = to;
                Ok(Some(seat.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn overwrite_seat(&self, id: i64, number: &str, status: SeatStatus) -> StoreResult<Option<Seat>> {
        let mut tables = self.tables.write().await;
        if !tables.seats.contains_key(&id) {
            return Ok(None);
        }
        if tables.number_taken(number, Some(id)) {
            return Err(StoreError::UniqueViolation("seats_number_key".to_string()));
        }
        let seat = Seat { id, number: number.to_string(), status };
        tables.seats.insert(id, seat.clone());
        Ok(Some(seat))
    }

    async fn delete_seat(&self, id: i64, keep_if: Option<SeatStatus>) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removable = match tables.seats.get(&id) {
            Some(seat) => keep_if != Some(seat.status),
            None => false,
        };
        if removable {
            tables.seats.remove(&id);
        }
        Ok(removable)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn list_users(&self, query: Option<&str>) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .rev()
            .filter(|u| query.map_or(true, |q| u.matches(q)))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = User {
            id: tables.next_id(),
            name: user.name.clone(),
            email: user.email.clone(),
            status: user.status,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, user: &NewUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|existing| {
            existing.name = user.name.clone();
            existing.email = user.email.clone();
            existing.status = user.status;
            existing.clone()
        }))
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn recent_logs(&self, limit: i64) -> StoreResult<Vec<ReservationLog>> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(tables.logs.values().rev().take(limit).cloned().collect())
    }

    async fn append_log(&self, message: &str) -> StoreResult<ReservationLog> {
        let mut tables = self.tables.write().await;
        let log = ReservationLog { id: tables.next_id(), message: message.to_string(), created_at: now() };
        tables.logs.insert(log.id, log.clone());
        Ok(log)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn record_audit(&self, action: &str, result: &str) -> StoreResult<MaintenanceAudit> {
        let mut tables = self.tables.write().await;
        let audit = MaintenanceAudit {
            id: tables.next_id(),
            action: action.to_string(),
            result: result.to_string(),
            created_at: now(),
        };
        tables.audit.insert(audit.id, audit.clone());
        Ok(audit)
    }

    async fn recent_audit(&self, limit: i64) -> StoreResult<Vec<MaintenanceAudit>> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(tables.audit.values().rev().take(limit).cloned().collect())
    }

    async fn last_audit(&self, action: &str) -> StoreResult<Option<MaintenanceAudit>> {
        let tables = self.tables.read().await;
        Ok(tables.audit.values().rev().find(|a| a.action == action).cloned())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_number_is_a_unique_violation() {
        let store = MemoryStore::new();
        store.insert_seat("1A", SeatStatus::Available).await.unwrap();

        let err = store.insert_seat("1A", SeatStatus::Available).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
        assert_eq!(store.list_seats().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transition_only_applies_from_expected_status() {
        let store = MemoryStore::new();
        let seat = store.insert_seat("1A", SeatStatus::Available).await.unwrap();

        let moved = store
            .transition_seat(seat.id, SeatStatus::Occupied, SeatStatus::Available)
            .await
            .unwrap();
        assert!(moved.is_none());

        let moved = store
            .transition_seat(seat.id, SeatStatus::Available, SeatStatus::Occupied)
            .await
            .unwrap();
        assert_eq!(moved.unwrap().status, SeatStatus::Occupied);
    }

    #[tokio::test]
    async fn overwrite_keeps_own_number_but_rejects_anothers() {
        let store = MemoryStore::new();
        let a = store.insert_seat("1A", SeatStatus::Available).await.unwrap();
        store.insert_seat("1B", SeatStatus::Available).await.unwrap();

        let same = store.overwrite_seat(a.id, "1A", SeatStatus::Maintenance).await.unwrap();
        assert_eq!(same.unwrap().status, SeatStatus::Maintenance);

        let err = store.overwrite_seat(a.id, "1B", SeatStatus::Available).await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn delete_respects_status_guard() {
        let store = MemoryStore::new();
        let seat = store.insert_seat("1A", SeatStatus::Occupied).await.unwrap();

        assert!(!store.delete_seat(seat.id, Some(SeatStatus::Occupied)).await.unwrap());
        assert!(store.delete_seat(seat.id, None).await.unwrap());
        assert!(!store.delete_seat(seat.id, None).await.unwrap());
    }

    #[tokio::test]
    async fn logs_come_back_newest_first_and_limited() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.append_log(&format!("entry {i}")).await.unwrap();
        }

        let logs = store.recent_logs(3).await.unwrap();
        let messages: Vec<_> = logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, ["entry 4", "entry 3", "entry 2"]);
    }
}
