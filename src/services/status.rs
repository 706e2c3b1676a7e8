//! status.rs
//!
//! Журнал состояния зала. Вместо периодического опроса хранилища
//! репортёр подписан на события `BookingFacade` и пишет в лог текущие
//! брони после каждого изменения.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::facade::{BookingFacade, SeatEvent};
use crate::store::SeatStore;

pub struct StatusReporter<S> {
    facade: BookingFacade<S>,
}

impl<S: SeatStore> StatusReporter<S> {
    pub fn new(facade: BookingFacade<S>) -> Self {
        Self { facade }
    }

    /// Запускает репортёр в фоне. Задача живёт, пока её не прервут через
    /// `JoinHandle::abort`.
    pub fn spawn(self) -> JoinHandle<()> {
        let events = self.facade.subscribe();
        tokio::spawn(self.run(events))
    }

    async fn run(self, mut events: broadcast::Receiver<SeatEvent>) {
        info!("Status reporter started");
        loop {
            match events.recv().await {
                Ok(event) => {
                    debug!(?event, "Seat state changed");
                    self.report().await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Status reporter lagged behind seat events");
                    self.report().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("Status reporter stopped");
    }

    /// Пишет текущие брони в лог и возвращает их строками вида
    /// "Seat 5 booked by Bob".
    pub async fn report(&self) -> Vec<String> {
        let bookings = match self.facade.list_booked().await {
            Ok(bookings) => bookings,
            Err(e) => {
                error!("Failed to read bookings for status report: {}", e);
                return Vec::new();
            }
        };

        let lines: Vec<String> = bookings
            .iter()
            .map(|b| format!("Seat {} booked by {}", b.seat_number, b.booked_by))
            .collect();

        info!(
            booked = lines.len(),
            total = self.facade.total_tickets(),
            "Current ticket status"
        );
        for line in &lines {
            info!("  {}", line);
        }
        lines
    }
}
