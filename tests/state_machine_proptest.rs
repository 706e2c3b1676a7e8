//! Model-based check of the seat state machine.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use seat_booking::{BookingError, BookingFacade, MemorySeatStore};

const SEATS: u32 = 8;

#[derive(Debug, Clone)]
enum Op {
    Book(u32, String),
    Cancel(u32),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..=SEATS + 1, "[a-z]{1,6}").prop_map(|(s, u)| Op::Book(s, u)),
        4 => (0..=SEATS + 1).prop_map(Op::Cancel),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    #[test]
    fn facade_matches_reference_model(ops in prop::collection::vec(op(), 1..60)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let facade = BookingFacade::new(MemorySeatStore::new(SEATS).unwrap()).unwrap();
            let mut model: Vec<Option<String>> = vec![None; SEATS as usize];

            for op in ops {
                match op {
                    Op::Book(seat, user) => {
                        let result = facade.book(seat, &user).await;
                        if seat == 0 || seat > SEATS {
                            prop_assert!(
                                matches!(result, Err(BookingError::InvalidSeat { .. })),
                                "expected InvalidSeat for seat {}",
                                seat
                            );
                            continue;
                        }
                        let slot = &mut model[(seat - 1) as usize];
                        let expected = slot.is_none();
                        if expected {
                            *slot = Some(user);
                        }
                        prop_assert_eq!(result.unwrap(), expected);
                    }
                    Op::Cancel(seat) => {
                        let result = facade.cancel(seat).await;
                        if seat == 0 || seat > SEATS {
                            prop_assert!(
                                matches!(result, Err(BookingError::InvalidSeat { .. })),
                                "expected InvalidSeat for seat {}",
                                seat
                            );
                            continue;
                        }
                        let expected = model[(seat - 1) as usize].take().is_some();
                        prop_assert_eq!(result.unwrap(), expected);
                    }
                    Op::Reset => {
                        facade.reset().await.unwrap();
                        model.iter_mut().for_each(|slot| *slot = None);
                    }
                }

                let actual: Vec<(u32, String)> = facade
                    .list_booked()
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|b| (b.seat_number, b.booked_by))
                    .collect();
                let expected: Vec<(u32, String)> = model
                    .iter()
                    .enumerate()
                    .filter_map(|(i, slot)| slot.clone().map(|u| (i as u32 + 1, u)))
                    .collect();
                prop_assert_eq!(actual, expected);
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
