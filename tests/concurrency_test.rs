//! Concurrent callers against one shared facade.
//!
//! Run with: `cargo test --test concurrency_test`

use std::collections::HashSet;
use std::sync::Arc;

use seat_booking::{BookingFacade, MemorySeatStore};
use tokio::sync::Barrier;

fn facade(total: u32) -> BookingFacade<MemorySeatStore> {
    BookingFacade::new(MemorySeatStore::new(total).unwrap()).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn exactly_one_of_many_concurrent_bookings_wins() {
    let facade = facade(1);
    let barrier = Arc::new(Barrier::new(100));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let facade = facade.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                let user = format!("user-{i}");
                barrier.wait().await;
                let won = facade.book(1, &user).await.unwrap();
                (user, won)
            })
        })
        .collect();

    let results: Vec<(String, bool)> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let winners: Vec<&String> = results.iter().filter(|(_, won)| *won).map(|(u, _)| u).collect();
    assert_eq!(winners.len(), 1, "exactly one booking must succeed");

    let booked = facade.list_booked().await.unwrap();
    assert_eq!(booked.len(), 1);
    assert_eq!(&booked[0].booked_by, winners[0]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn every_seat_gets_a_single_winner_under_contention() {
    const SEATS: u32 = 20;
    const USERS: usize = 10;
    let facade = facade(SEATS);

    let mut handles = Vec::new();
    for seat in 1..=SEATS {
        for u in 0..USERS {
            let facade = facade.clone();
            handles.push(tokio::spawn(async move {
                let user = format!("s{seat}-u{u}");
                let won = facade.book(seat, &user).await.unwrap();
                (seat, user, won)
            }));
        }
    }

    let results: Vec<(u32, String, bool)> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let booked = facade.list_booked().await.unwrap();
    assert_eq!(booked.len(), SEATS as usize);

    for seat in 1..=SEATS {
        let winners: Vec<&String> = results
            .iter()
            .filter(|(s, _, won)| *s == seat && *won)
            .map(|(_, u, _)| u)
            .collect();
        assert_eq!(winners.len(), 1, "seat {seat} must have one winner");
        assert_eq!(&booked[(seat - 1) as usize].booked_by, winners[0]);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_cancels_free_a_seat_once() {
    let facade = facade(3);
    facade.book(2, "Alice").await.unwrap();

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let facade = facade.clone();
            tokio::spawn(async move { facade.cancel(2).await.unwrap() })
        })
        .collect();

    let successes = futures::future::join_all(handles)
        .await
        .into_iter()
        .filter(|r| *r.as_ref().unwrap())
        .count();

    assert_eq!(successes, 1);
    assert!(facade.list_booked().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn snapshots_never_observe_partial_writes() {
    let facade = facade(10);
    // Места 1..=5 заняты до начала чтений и не меняются
    for seat in 1..=5 {
        facade.book(seat, &format!("stable-{seat}")).await.unwrap();
    }

    let writer = {
        let facade = facade.clone();
        tokio::spawn(async move {
            for round in 0..200 {
                let seat = 6 + (round % 5);
                facade.book(seat, &format!("w{round}")).await.unwrap();
                facade.cancel(seat).await.unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let facade = facade.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let snapshot = facade.list_booked().await.unwrap();
                    let numbers: Vec<u32> = snapshot.iter().map(|b| b.seat_number).collect();

                    let mut sorted = numbers.clone();
                    sorted.sort_unstable();
                    assert_eq!(numbers, sorted, "snapshot must be ordered");

                    let unique: HashSet<u32> = numbers.iter().copied().collect();
                    assert_eq!(unique.len(), numbers.len());

                    for seat in 1..=5 {
                        assert!(unique.contains(&seat), "stable seat {seat} missing");
                    }
                    assert!(snapshot.iter().all(|b| !b.booked_by.is_empty()));
                }
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn subscribers_see_changes_in_linearization_order() {
    let facade = facade(1);
    let mut events = facade.subscribe();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let facade = facade.clone();
            tokio::spawn(async move {
                if facade.book(1, &format!("u{i}")).await.unwrap() {
                    facade.cancel(1).await.unwrap();
                }
            })
        })
        .collect();
    futures::future::join_all(handles).await;

    // booked/cancelled must alternate, starting with booked
    let mut expect_booked = true;
    while let Ok(event) = events.try_recv() {
        match event {
            seat_booking::SeatEvent::Booked { .. } => assert!(expect_booked),
            seat_booking::SeatEvent::Cancelled { .. } => assert!(!expect_booked),
            seat_booking::SeatEvent::Reset => panic!("unexpected reset"),
        }
        expect_booked = !expect_booked;
    }
    assert!(expect_booked, "last event must be a cancellation");
}
