//! Concurrency tests for the seat ledger.
//!
//! Many tasks race for the same seat; exactly one booking may win and the
//! rest must see `AlreadyBooked`. Distinct seats never block each other.

use futures::future::join_all;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use smartseat::models::SeatStatus;
use smartseat::services::{LedgerError, RetryPolicy, SeatLedger};
use smartseat::store::MemoryStore;

fn ledger() -> SeatLedger {
    SeatLedger::new(
        Arc::new(MemoryStore::new()),
        RetryPolicy { attempts: 3, backoff: Duration::from_millis(1) },
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bookings_of_one_seat_have_a_single_winner() {
    let ledger = ledger();
    let seat = ledger.create_seat("12A", SeatStatus::Available).await.unwrap();

    let seat_id = seat.id;
    let attempts = (0..32).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.book(seat_id).await })
    });
    let results: Vec<_> = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let already_booked = results
        .iter()
        .filter(|r| matches!(r, Err(LedgerError::AlreadyBooked)))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(already_booked, 31);

    let seats = ledger.list_seats().await.unwrap();
    assert_eq!(seats[0].status, SeatStatus::Occupied);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancellations_release_once() {
    let ledger = ledger();
    let seat = ledger.create_seat("3C", SeatStatus::Occupied).await.unwrap();

    let seat_id = seat.id;
    let attempts = (0..16).map(|_| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.cancel(seat_id).await })
    });
    let results: Vec<_> = join_all(attempts).await.into_iter().map(|r| r.unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(LedgerError::NotBooked))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn distinct_seats_book_independently() {
    let ledger = ledger();
    let mut ids = Vec::new();
    for i in 0..16 {
        ids.push(ledger.create_seat(&format!("R{i}"), SeatStatus::Available).await.unwrap().id);
    }

    let attempts = ids.iter().map(|&id| {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.book(id).await })
    });
    let results = join_all(attempts).await;

    assert!(results.into_iter().all(|r| r.unwrap().is_ok()));
    assert!(ledger.list_seats().await.unwrap().iter().all(|s| s.is_booked()));
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Book(usize),
    Cancel(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(0usize..3).prop_map(Op::Book), (0usize..3).prop_map(Op::Cancel)]
}

proptest! {
    // Модель: место занято или свободно. Каждая операция ledger обязана
    // совпасть с моделью и по результату, и по итоговому состоянию.
    #[test]
    fn ledger_follows_the_booking_state_machine(ops in prop::collection::vec(op(), 1..40)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let ledger = ledger();
            let mut ids = Vec::new();
            for number in ["A1", "A2", "A3"] {
                ids.push(ledger.create_seat(number, SeatStatus::Available).await.unwrap().id);
            }
            let mut booked: HashMap<i64, bool> = ids.iter().map(|&id| (id, false)).collect();

            for op in ops {
                match op {
                    Op::Book(i) => {
                        let id = ids[i];
                        let result = ledger.book(id).await;
                        if booked[&id] {
                            assert!(matches!(result, Err(LedgerError::AlreadyBooked)));
                        } else {
                            assert!(result.is_ok());
                            booked.insert(id, true);
                        }
                    }
                    Op::Cancel(i) => {
                        let id = ids[i];
                        let result = ledger.cancel(id).await;
                        if booked[&id] {
                            assert!(result.is_ok());
                            booked.insert(id, false);
                        } else {
                            assert!(matches!(result, Err(LedgerError::NotBooked)));
                        }
                    }
                }
            }

            for seat in ledger.list_seats().await.unwrap() {
                let expected = if booked[&seat.id] { SeatStatus::Occupied } else { SeatStatus::Available };
                assert_eq!(seat.status, expected);
            }
        });
    }
}
