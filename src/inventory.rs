//! Зал фиксированного размера и переходы состояния мест.
//!
//! `SeatInventory` сам не синхронизирован: каждая операция - это
//! последовательность "прочитать, решить, записать", и атомарной её делает
//! `BookingFacade`, который держит инвентарь под единой блокировкой.

use chrono::Utc;
use tracing::debug;

use crate::error::{BookingError, BookingResult};
use crate::models::{Booking, Seat};
use crate::store::SeatStore;

pub struct SeatInventory<S> {
    store: S,
    total_tickets: u32,
}

impl<S: SeatStore> SeatInventory<S> {
    pub fn new(store: S) -> BookingResult<Self> {
        let total_tickets = store.total_tickets();
        if total_tickets == 0 {
            return Err(BookingError::EmptyInventory);
        }
        Ok(Self { store, total_tickets })
    }

    pub fn total_tickets(&self) -> u32 {
        self.total_tickets
    }

    fn check_seat(&self, seat: u32) -> BookingResult<()> {
        if seat == 0 || seat > self.total_tickets {
            return Err(BookingError::InvalidSeat {
                seat,
                total: self.total_tickets,
            });
        }
        Ok(())
    }

    /// Забронировать свободное место. `Ok(false)` - место уже занято
    /// (в том числе этим же пользователем). Имя сохраняется как передано.
    pub async fn book(&mut self, seat: u32, user: &str) -> BookingResult<bool> {
        self.check_seat(seat)?;
        if user.is_empty() {
            return Err(BookingError::InvalidUser);
        }

        let mut current = self.store.fetch(seat).await?;
        if !current.book(user, Utc::now()) {
            debug!(seat, holder = ?current.booked_by(), "Seat already booked");
            return Ok(false);
        }

        self.store.save(&current).await?;
        Ok(true)
    }

    /// Снять бронь. `Ok(false)` - место и так свободно.
    pub async fn cancel(&mut self, seat: u32) -> BookingResult<bool> {
        self.check_seat(seat)?;

        let mut current = self.store.fetch(seat).await?;
        if !current.cancel() {
            debug!(seat, "Seat is not booked");
            return Ok(false);
        }

        self.store.save(&current).await?;
        Ok(true)
    }

    pub async fn list_booked(&mut self) -> BookingResult<Vec<Booking>> {
        self.store.booked().await
    }

    pub async fn seats(&mut self) -> BookingResult<Vec<Seat>> {
        self.store.seats().await
    }

    pub async fn reset(&mut self) -> BookingResult<()> {
        self.store.clear().await
    }

    pub async fn close(&mut self) {
        self.store.close().await
    }
}
