use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::database::Database;
use crate::error::{BookingError, BookingResult};
use crate::models::{Booking, Seat, SeatState};
use crate::store::SeatStore;

/// Места в таблице `tickets`. Брони переживают перезапуск процесса.
pub struct PgSeatStore {
    db: Database,
    total_tickets: u32,
}

#[derive(Debug, FromRow)]
struct TicketRow {
    seat_number: i32,
    is_booked: bool,
    booked_by: Option<String>,
    booked_at: Option<DateTime<Utc>>,
}

impl TicketRow {
    fn into_seat(self) -> BookingResult<Seat> {
        let raw = i64::from(self.seat_number);
        let number = match u32::try_from(self.seat_number) {
            Ok(number) if number > 0 => number,
            _ => return Err(BookingError::InconsistentRow(raw)),
        };
        let state = match (self.is_booked, self.booked_by, self.booked_at) {
            (true, Some(by), Some(at)) => SeatState::Booked { by, at },
            (false, None, None) => SeatState::Free,
            _ => return Err(BookingError::InconsistentRow(raw)),
        };
        Ok(Seat::with_state(number, state))
    }
}

// В Postgres нет беззнаковых целых
fn pg_seat(number: u32) -> BookingResult<i32> {
    i32::try_from(number).map_err(|_| BookingError::SeatNotPersisted(number))
}

impl PgSeatStore {
    /// Подключается, применяет миграции и создаёт недостающие места.
    /// Уже существующие брони сохраняются.
    pub async fn connect(config: &DatabaseConfig, total_tickets: u32) -> BookingResult<Self> {
        let db = Database::connect(config).await?;
        db.run_migrations().await?;
        Self::with_database(db, total_tickets).await
    }

    pub async fn with_database(db: Database, total_tickets: u32) -> BookingResult<Self> {
        if total_tickets == 0 {
            return Err(BookingError::EmptyInventory);
        }
        let total = pg_seat(total_tickets)?;

        let inserted = sqlx::query(
            "INSERT INTO tickets (seat_number)
             SELECT generate_series(1, $1)
             ON CONFLICT (seat_number) DO NOTHING",
        )
        .bind(total)
        .execute(&db.pool)
        .await?
        .rows_affected();

        let extra: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE seat_number > $1")
            .bind(total)
            .fetch_one(&db.pool)
            .await?;
        if extra > 0 {
            warn!(extra, total_tickets, "Ignoring stored seats beyond the configured inventory");
        }

        info!(total_tickets, inserted, "Ticket table initialized");
        Ok(Self { db, total_tickets })
    }

    async fn commit_update(
        &self,
        target: String,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
        expected_rows: u64,
    ) -> BookingResult<()> {
        let mut tx = self.db.pool.begin().await?;

        let affected = query.execute(&mut *tx).await?.rows_affected();
        if affected != expected_rows {
            if let Err(e) = tx.rollback().await {
                warn!(%target, "Rollback after rejected update failed: {}", e);
            }
            return Err(BookingError::CommitFailure {
                target,
                reason: format!("expected {expected_rows} updated rows, got {affected}"),
            });
        }

        tx.commit().await.map_err(|e| BookingError::CommitFailure {
            target,
            reason: e.to_string(),
        })
    }
}

impl SeatStore for PgSeatStore {
    fn total_tickets(&self) -> u32 {
        self.total_tickets
    }

    async fn fetch(&mut self, number: u32) -> BookingResult<Seat> {
        let row: Option<TicketRow> = sqlx::query_as(
            "SELECT seat_number, is_booked, booked_by, booked_at
             FROM tickets
             WHERE seat_number = $1",
        )
        .bind(pg_seat(number)?)
        .fetch_optional(&self.db.pool)
        .await?;

        row.ok_or(BookingError::SeatNotPersisted(number))?.into_seat()
    }

    async fn save(&mut self, seat: &Seat) -> BookingResult<()> {
        let query = sqlx::query(
            "UPDATE tickets
             SET is_booked = $2, booked_by = $3, booked_at = $4
             WHERE seat_number = $1",
        )
        .bind(pg_seat(seat.number)?)
        .bind(seat.is_booked())
        .bind(seat.booked_by().map(str::to_string))
        .bind(seat.booked_at());

        self.commit_update(format!("seat {}", seat.number), query, 1)
            .await?;
        debug!(seat = seat.number, booked = seat.is_booked(), "Seat state committed");
        Ok(())
    }

    async fn seats(&mut self) -> BookingResult<Vec<Seat>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT seat_number, is_booked, booked_by, booked_at
             FROM tickets
             WHERE seat_number BETWEEN 1 AND $1
             ORDER BY seat_number",
        )
        .bind(pg_seat(self.total_tickets)?)
        .fetch_all(&self.db.pool)
        .await?;

        rows.into_iter().map(TicketRow::into_seat).collect()
    }

    async fn booked(&mut self) -> BookingResult<Vec<Booking>> {
        let rows: Vec<TicketRow> = sqlx::query_as(
            "SELECT seat_number, is_booked, booked_by, booked_at
             FROM tickets
             WHERE is_booked = TRUE AND seat_number BETWEEN 1 AND $1
             ORDER BY seat_number",
        )
        .bind(pg_seat(self.total_tickets)?)
        .fetch_all(&self.db.pool)
        .await?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            let seat = row.into_seat()?;
            let number = seat.number;
            bookings.push(
                seat.booking()
                    .ok_or(BookingError::InconsistentRow(i64::from(number)))?,
            );
        }
        Ok(bookings)
    }

    async fn clear(&mut self) -> BookingResult<()> {
        let mut tx = self.db.pool.begin().await?;
        sqlx::query(
            "UPDATE tickets
             SET is_booked = FALSE, booked_by = NULL, booked_at = NULL
             WHERE is_booked = TRUE",
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(|e| BookingError::CommitFailure {
            target: "reset".to_string(),
            reason: e.to_string(),
        })
    }

    async fn close(&mut self) {
        self.db.close().await;
    }
}
