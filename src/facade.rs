//! Единая критическая секция над залом.
//!
//! Каждая операция (`book`, `cancel`, `list_booked`, `reset`) выполняется
//! целиком под одним `tokio::sync::Mutex`, поэтому два конкурентных вызова
//! не могут оба увидеть место свободным и оба вернуть успех.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use tracing::{info, instrument, warn};

use crate::error::{BookingError, BookingResult};
use crate::inventory::SeatInventory;
use crate::models::{Booking, Seat};
use crate::store::SeatStore;

/// Изменение состояния зала, рассылаемое подписчикам.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SeatEvent {
    Booked { seat: u32, user: String },
    Cancelled { seat: u32 },
    Reset,
}

/// Верхняя граница буфера событий; `broadcast::channel` паникует на
/// ёмкости больше `usize::MAX / 2`.
pub const MAX_EVENT_BUFFER: usize = 1 << 16;

#[derive(Debug, Clone)]
pub struct FacadeOptions {
    /// Сколько ждать блокировку; `None` - ждать сколько угодно
    pub lock_timeout: Option<Duration>,
    /// Размер буфера событий для медленных подписчиков
    pub event_buffer: usize,
}

impl Default for FacadeOptions {
    fn default() -> Self {
        Self {
            lock_timeout: None,
            event_buffer: 64,
        }
    }
}

struct Shared<S> {
    inventory: Mutex<SeatInventory<S>>,
    events: broadcast::Sender<SeatEvent>,
    lock_timeout: Option<Duration>,
    total_tickets: u32,
}

pub struct BookingFacade<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for BookingFacade<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SeatStore> BookingFacade<S> {
    pub fn new(store: S) -> BookingResult<Self> {
        Self::with_options(store, FacadeOptions::default())
    }

    pub fn with_options(store: S, options: FacadeOptions) -> BookingResult<Self> {
        let inventory = SeatInventory::new(store)?;
        let total_tickets = inventory.total_tickets();
        let (events, _) = broadcast::channel(options.event_buffer.clamp(1, MAX_EVENT_BUFFER));

        Ok(Self {
            shared: Arc::new(Shared {
                inventory: Mutex::new(inventory),
                events,
                lock_timeout: options.lock_timeout,
                total_tickets,
            }),
        })
    }

    pub fn total_tickets(&self) -> u32 {
        self.shared.total_tickets
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SeatEvent> {
        self.shared.events.subscribe()
    }

    async fn acquire(&self) -> BookingResult<MutexGuard<'_, SeatInventory<S>>> {
        match self.shared.lock_timeout {
            Some(limit) => tokio::time::timeout(limit, self.shared.inventory.lock())
                .await
                .map_err(|_| {
                    warn!(?limit, "Booking lock acquisition timed out");
                    BookingError::LockTimeout(limit)
                }),
            None => Ok(self.shared.inventory.lock().await),
        }
    }

    // Событие уходит до снятия блокировки, поэтому подписчики видят их
    // в том же порядке, в каком выполнялись операции
    fn notify(&self, event: SeatEvent) {
        // ошибка send означает только отсутствие подписчиков
        let _ = self.shared.events.send(event);
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn book(&self, seat: u32, user: &str) -> BookingResult<bool> {
        let mut inventory = self.acquire().await?;
        let booked = inventory.book(seat, user).await?;
        if booked {
            info!(seat, user, "Seat booked");
            self.notify(SeatEvent::Booked {
                seat,
                user: user.to_string(),
            });
        }
        Ok(booked)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn cancel(&self, seat: u32) -> BookingResult<bool> {
        let mut inventory = self.acquire().await?;
        let cancelled = inventory.cancel(seat).await?;
        if cancelled {
            info!(seat, "Booking cancelled");
            self.notify(SeatEvent::Cancelled { seat });
        }
        Ok(cancelled)
    }

    /// Снимок занятых мест по возрастанию номера. Блокировка держится
    /// только на время чтения.
    pub async fn list_booked(&self) -> BookingResult<Vec<Booking>> {
        self.acquire().await?.list_booked().await
    }

    /// Снимок всех мест, включая свободные.
    pub async fn seats(&self) -> BookingResult<Vec<Seat>> {
        self.acquire().await?.seats().await
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn reset(&self) -> BookingResult<()> {
        let mut inventory = self.acquire().await?;
        inventory.reset().await?;
        info!("All bookings reset");
        self.notify(SeatEvent::Reset);
        Ok(())
    }

    pub async fn close(&self) {
        let mut inventory = self.shared.inventory.lock().await;
        inventory.close().await;
    }

    #[cfg(test)]
    pub(crate) async fn hold_lock(&self) -> MutexGuard<'_, SeatInventory<S>> {
        self.shared.inventory.lock().await
    }
}
