use crate::error::{BookingError, BookingResult};
use crate::models::{Booking, Seat};
use crate::store::SeatStore;

/// Места в памяти процесса: индекс `i` соответствует месту `i + 1`.
#[derive(Debug, Clone)]
pub struct MemorySeatStore {
    seats: Vec<Seat>,
}

impl MemorySeatStore {
    pub fn new(total_tickets: u32) -> BookingResult<Self> {
        if total_tickets == 0 {
            return Err(BookingError::EmptyInventory);
        }
        let seats = (1..=total_tickets).map(Seat::new).collect();
        Ok(Self { seats })
    }

    fn slot(&self, number: u32) -> BookingResult<usize> {
        let index = (number as usize).wrapping_sub(1);
        if index < self.seats.len() {
            Ok(index)
        } else {
            Err(BookingError::SeatNotPersisted(number))
        }
    }
}

impl SeatStore for MemorySeatStore {
    fn total_tickets(&self) -> u32 {
        self.seats.len() as u32
    }

    async fn fetch(&mut self, number: u32) -> BookingResult<Seat> {
        let index = self.slot(number)?;
        Ok(self.seats[index].clone())
    }

    async fn save(&mut self, seat: &Seat) -> BookingResult<()> {
        let index = self.slot(seat.number)?;
        self.seats[index] = seat.clone();
        Ok(())
    }

    async fn seats(&mut self) -> BookingResult<Vec<Seat>> {
        Ok(self.seats.clone())
    }

    async fn booked(&mut self) -> BookingResult<Vec<Booking>> {
        Ok(self.seats.iter().filter_map(Seat::booking).collect())
    }

    async fn clear(&mut self) -> BookingResult<()> {
        for seat in &mut self.seats {
            seat.cancel();
        }
        Ok(())
    }

    async fn close(&mut self) {}
}
