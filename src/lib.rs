pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod facade;
pub mod inventory;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

pub use error::{BookingError, BookingResult};
pub use facade::{BookingFacade, FacadeOptions, SeatEvent};
pub use inventory::SeatInventory;
pub use models::{Booking, Seat, SeatState};
pub use store::{Backend, MemorySeatStore, PgSeatStore, SeatStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub facade: BookingFacade<Backend>,
    pub config: config::Config,
}

impl AppState {
    /// Выбирает хранилище по конфигурации: Postgres, если задан
    /// `DATABASE_URL`, иначе память. Недоступная база - ошибка, а не
    /// тихий откат на память.
    pub async fn new(config: config::Config) -> BookingResult<Arc<Self>> {
        let total = config.inventory.total_tickets;
        let backend = match &config.database {
            Some(db) => Backend::Postgres(PgSeatStore::connect(db, total).await?),
            None => Backend::Memory(MemorySeatStore::new(total)?),
        };
        tracing::info!(backend = backend.kind(), total, "Seat store ready");

        let options = FacadeOptions {
            lock_timeout: config.inventory.lock_timeout(),
            event_buffer: config.inventory.event_buffer,
        };
        let facade = BookingFacade::with_options(backend, options)?;

        Ok(Arc::new(Self { facade, config }))
    }
}
