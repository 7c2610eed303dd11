//! ledger.rs
//!
//! Учет мест и их занятости. Единственное место, где меняется статус места.
//!
//! Бронь и отмена выполняются одним условным UPDATE
//! (`... WHERE id = $1 AND status = $2`), поэтому два одновременных запроса
//! на одно место не могут оба увидеть `available` и оба выиграть. Если
//! переход не применился, строка перечитывается только для того, чтобы
//! объяснить отказ. Разные места друг друга не блокируют.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::models::{Seat, SeatStatus};
use crate::store::{SeatStore, StoreError, StoreResult};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Seat number must not be empty.")]
    InvalidNumber,

    #[error("Seat {0} already exists.")]
    DuplicateSeat(String),

    #[error("Seat not found.")]
    SeatNotFound,

    #[error("Seat already booked.")]
    AlreadyBooked,

    #[error("Seat is not booked.")]
    NotBooked,

    #[error("Seat is under maintenance.")]
    UnderMaintenance,

    /// Удаление занятого места без `force`.
    #[error("Seat {0} is currently booked.")]
    SeatBooked(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Повтор временных сбоев хранилища: не более `attempts` повторов,
/// пауза растет линейно.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            attempts: config.retry_attempts,
            backoff: config.retry_backoff(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfirmation {
    pub seat: Seat,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Book,
    Cancel,
}

impl Transition {
    fn name(self) -> &'static str {
        match self {
            Transition::Book => "book",
            Transition::Cancel => "cancel",
        }
    }

    fn edge(self) -> (SeatStatus, SeatStatus) {
        match self {
            Transition::Book => (SeatStatus::Available, SeatStatus::Occupied),
            Transition::Cancel => (SeatStatus::Occupied, SeatStatus::Available),
        }
    }

    // Почему переход из `current` невозможен. None: место уже снова в
    // исходном состоянии (конкурентное изменение), можно пробовать еще раз.
    fn rejection(self, current: SeatStatus) -> Option<LedgerError> {
        match (self, current) {
            (Transition::Book, SeatStatus::Occupied) => Some(LedgerError::AlreadyBooked),
            (Transition::Book, SeatStatus::Maintenance) => Some(LedgerError::UnderMaintenance),
            (Transition::Book, SeatStatus::Available) => None,
            (Transition::Cancel, SeatStatus::Available | SeatStatus::Maintenance) => Some(LedgerError::NotBooked),
            (Transition::Cancel, SeatStatus::Occupied) => None,
        }
    }

    fn contended(self) -> LedgerError {
        match self {
            Transition::Book => LedgerError::AlreadyBooked,
            Transition::Cancel => LedgerError::NotBooked,
        }
    }

    fn confirm(self, seat: Seat) -> BookingConfirmation {
        let message = match self {
            Transition::Book => format!("Seat {} booked successfully.", seat.number),
            Transition::Cancel => format!("Booking for seat {} canceled successfully.", seat.number),
        };
        BookingConfirmation { seat, message }
    }
}

#[derive(Clone)]
pub struct SeatLedger {
    store: Arc<dyn SeatStore>,
    retry: RetryPolicy,
}

impl SeatLedger {
    pub fn new(store: Arc<dyn SeatStore>, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Все места, новые первыми.
    pub async fn list_seats(&self) -> Result<Vec<Seat>, LedgerError> {
        Ok(self.store.list_seats().await?)
    }

    pub async fn create_seat(&self, number: &str, status: SeatStatus) -> Result<Seat, LedgerError> {
        let number = normalize_number(number)?;
        let seat = self
            .store
            .insert_seat(number, status)
            .await
            .map_err(|e| duplicate_or(e, number))?;
        info!(seat_id = seat.id, number = %seat.number, status = %seat.status, "seat created");
        Ok(seat)
    }

    pub async fn book(&self, seat_id: i64) -> Result<BookingConfirmation, LedgerError> {
        self.apply(seat_id, Transition::Book).await
    }

    pub async fn cancel(&self, seat_id: i64) -> Result<BookingConfirmation, LedgerError> {
        self.apply(seat_id, Transition::Cancel).await
    }

    /// Административная перезапись номера и статуса. Проверки брони и
    /// отмены здесь намеренно не выполняются: так дашборд переводит места
    /// в обслуживание и обратно.
    pub async fn update_seat(&self, seat_id: i64, number: &str, status: SeatStatus) -> Result<Seat, LedgerError> {
        let number = normalize_number(number)?;
        let seat = self
            .store
            .overwrite_seat(seat_id, number, status)
            .await
            .map_err(|e| duplicate_or(e, number))?
            .ok_or(LedgerError::SeatNotFound)?;
        info!(seat_id, number = %seat.number, status = %seat.status, "seat overwritten by administrator");
        Ok(seat)
    }

    /// Удаляет место. Отсутствующее место: ничего не делает. Занятое место
    /// удаляется только с `force`.
    pub async fn delete_seat(&self, seat_id: i64, force: bool) -> Result<(), LedgerError> {
        let keep_if = (!force).then_some(SeatStatus::Occupied);
        if self.store.delete_seat(seat_id, keep_if).await? {
            info!(seat_id, force, "seat deleted");
            return Ok(());
        }

        match self.store.find_seat(seat_id).await? {
            None => {
                debug!(seat_id, "delete of missing seat ignored");
                Ok(())
            }
            Some(seat) => Err(LedgerError::SeatBooked(seat.number)),
        }
    }

    async fn apply(&self, seat_id: i64, transition: Transition) -> Result<BookingConfirmation, LedgerError> {
        let (from, to) = transition.edge();

        for _ in 0..=self.retry.attempts {
            // Запись повторяем, только если запрос не ушел на сервер: после
            // обрыва соединения переход мог уже зафиксироваться.
            let moved = self
                .with_retry(transition.name(), StoreError::is_unsent, || {
                    self.store.transition_seat(seat_id, from, to)
                })
                .await?;
            if let Some(seat) = moved {
                info!(seat_id, number = %seat.number, status = %seat.status, "seat {}", transition.name());
                return Ok(transition.confirm(seat));
            }

            let current = self
                .with_retry("find_seat", StoreError::is_transient, || self.store.find_seat(seat_id))
                .await?
                .ok_or(LedgerError::SeatNotFound)?;

            match transition.rejection(current.status) {
                Some(err) => {
                    debug!(seat_id, status = %current.status, "{} rejected: {}", transition.name(), err);
                    return Err(err);
                }
                None => debug!(seat_id, "seat changed concurrently, retrying {}", transition.name()),
            }
        }

        Err(transition.contended())
    }

    async fn with_retry<T, F, Fut>(
        &self,
        op: &'static str,
        retryable: fn(&StoreError) -> bool,
        mut call: F,
    ) -> StoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(err) if retryable(&err) && attempt < self.retry.attempts => {
                    attempt += 1;
                    warn!(op, attempt, error = %err, "transient storage failure, retrying");
                    tokio::time::sleep(self.retry.backoff * attempt).await;
                }
                result => return result,
            }
        }
    }
}

fn normalize_number(number: &str) -> Result<&str, LedgerError> {
    let number = number.trim();
    if number.is_empty() {
        return Err(LedgerError::InvalidNumber);
    }
    Ok(number)
}

fn duplicate_or(err: StoreError, number: &str) -> LedgerError {
    match err {
        StoreError::UniqueViolation(_) => LedgerError::DuplicateSeat(number.to_string()),
        other => LedgerError::Store(other),
    }
}
