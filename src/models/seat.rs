use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Состояние брони одного места.
///
/// Флаг "занято" и имя владельца живут в одном варианте, поэтому
/// занятое место без владельца (и наоборот) непредставимо.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeatState {
    Free,
    Booked { by: String, at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub number: u32,
    #[serde(flatten)]
    state: SeatState,
}

/// Запись в списке текущих броней.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub seat_number: u32,
    pub booked_by: String,
    pub booked_at: DateTime<Utc>,
}

impl Seat {
    pub fn new(number: u32) -> Self {
        Self { number, state: SeatState::Free }
    }

    pub(crate) fn with_state(number: u32, state: SeatState) -> Self {
        Self { number, state }
    }

    pub fn state(&self) -> &SeatState {
        &self.state
    }

    pub fn is_booked(&self) -> bool {
        matches!(self.state, SeatState::Booked { .. })
    }

    pub fn booked_by(&self) -> Option<&str> {
        match &self.state {
            SeatState::Booked { by, .. } => Some(by),
            SeatState::Free => None,
        }
    }

    pub fn booked_at(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            SeatState::Booked { at, .. } => Some(*at),
            SeatState::Free => None,
        }
    }

    // free -> booked; занятое место не трогаем, даже если бронирует тот же пользователь
    pub(crate) fn book(&mut self, user: &str, at: DateTime<Utc>) -> bool {
        if self.is_booked() {
            return false;
        }
        self.state = SeatState::Booked { by: user.to_string(), at };
        true
    }

    // booked -> free
    pub(crate) fn cancel(&mut self) -> bool {
        if !self.is_booked() {
            return false;
        }
        self.state = SeatState::Free;
        true
    }

    pub fn booking(&self) -> Option<Booking> {
        match &self.state {
            SeatState::Booked { by, at } => Some(Booking {
                seat_number: self.number,
                booked_by: by.clone(),
                booked_at: *at,
            }),
            SeatState::Free => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_seat_is_free() {
        let seat = Seat::new(7);
        assert_eq!(seat.number, 7);
        assert!(!seat.is_booked());
        assert_eq!(seat.booked_by(), None);
        assert_eq!(seat.booking(), None);
    }

    #[test]
    fn book_sets_holder_and_rejects_second_booking() {
        let mut seat = Seat::new(1);
        let at = Utc::now();

        assert!(seat.book("Alice", at));
        assert_eq!(seat.booked_by(), Some("Alice"));
        assert_eq!(seat.booked_at(), Some(at));

        assert!(!seat.book("Alice", Utc::now()));
        assert!(!seat.book("Bob", Utc::now()));
        assert_eq!(seat.booked_by(), Some("Alice"));
    }

    #[test]
    fn cancel_clears_holder_once() {
        let mut seat = Seat::new(3);
        assert!(!seat.cancel());

        seat.book("Carol", Utc::now());
        assert!(seat.cancel());
        assert!(!seat.is_booked());
        assert_eq!(seat.booked_by(), None);
        assert!(!seat.cancel());
    }

    #[test]
    fn serializes_with_flat_status() {
        let seat = Seat::new(4);
        let json = serde_json::to_value(&seat).unwrap();
        assert_eq!(json, serde_json::json!({ "number": 4, "status": "free" }));

        let mut seat = Seat::new(5);
        seat.book("Dave", Utc::now());
        let json = serde_json::to_value(&seat).unwrap();
        assert_eq!(json["status"], "booked");
        assert_eq!(json["by"], "Dave");
    }
}
