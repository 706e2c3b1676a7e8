//! Стратегии хранения состояния мест.
//!
//! Логика блокировок и переходов состояния живёт в `inventory` и `facade`
//! и пишется один раз; хранилище только читает и записывает места.

use std::future::Future;

use crate::error::BookingResult;
use crate::models::{Booking, Seat};

pub mod memory;
pub mod postgres;

pub use memory::MemorySeatStore;
pub use postgres::PgSeatStore;

/// Хранилище мест с номерами `1..=total_tickets`.
///
/// Вызовы не синхронизируются самим хранилищем: `BookingFacade` держит
/// его под единой блокировкой, поэтому методы принимают `&mut self`.
pub trait SeatStore: Send + 'static {
    fn total_tickets(&self) -> u32;

    /// Прочитать состояние одного места.
    fn fetch(&mut self, number: u32) -> impl Future<Output = BookingResult<Seat>> + Send;

    /// Записать состояние одного места. Ошибка записи означает, что
    /// изменение не применено.
    fn save(&mut self, seat: &Seat) -> impl Future<Output = BookingResult<()>> + Send;

    /// Все места по возрастанию номера.
    fn seats(&mut self) -> impl Future<Output = BookingResult<Vec<Seat>>> + Send;

    /// Занятые места по возрастанию номера.
    fn booked(&mut self) -> impl Future<Output = BookingResult<Vec<Booking>>> + Send;

    /// Снять все брони.
    fn clear(&mut self) -> impl Future<Output = BookingResult<()>> + Send;

    /// Освободить соединения. Повторный вызов безопасен.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Хранилище, выбранное при старте процесса.
pub enum Backend {
    Memory(MemorySeatStore),
    Postgres(PgSeatStore),
}

impl Backend {
    pub fn kind(&self) -> &'static str {
        match self {
            Backend::Memory(_) => "memory",
            Backend::Postgres(_) => "postgres",
        }
    }
}

impl SeatStore for Backend {
    fn total_tickets(&self) -> u32 {
        match self {
            Backend::Memory(store) => store.total_tickets(),
            Backend::Postgres(store) => store.total_tickets(),
        }
    }

    async fn fetch(&mut self, number: u32) -> BookingResult<Seat> {
        match self {
            Backend::Memory(store) => store.fetch(number).await,
            Backend::Postgres(store) => store.fetch(number).await,
        }
    }

    async fn save(&mut self, seat: &Seat) -> BookingResult<()> {
        match self {
            Backend::Memory(store) => store.save(seat).await,
            Backend::Postgres(store) => store.save(seat).await,
        }
    }

    async fn seats(&mut self) -> BookingResult<Vec<Seat>> {
        match self {
            Backend::Memory(store) => store.seats().await,
            Backend::Postgres(store) => store.seats().await,
        }
    }

    async fn booked(&mut self) -> BookingResult<Vec<Booking>> {
        match self {
            Backend::Memory(store) => store.booked().await,
            Backend::Postgres(store) => store.booked().await,
        }
    }

    async fn clear(&mut self) -> BookingResult<()> {
        match self {
            Backend::Memory(store) => store.clear().await,
            Backend::Postgres(store) => store.clear().await,
        }
    }

    async fn close(&mut self) {
        match self {
            Backend::Memory(store) => store.close().await,
            Backend::Postgres(store) => store.close().await,
        }
    }
}
