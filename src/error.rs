use std::time::Duration;
use thiserror::Error;

/// Ошибки ядра бронирования.
///
/// Конкуренция за место (место уже занято / уже свободно) сюда не входит:
/// это обычный исход `book`/`cancel`, он возвращается как `false`.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("seat {seat} is out of range 1..={total}")]
    InvalidSeat { seat: u32, total: u32 },

    #[error("user identity must not be empty")]
    InvalidUser,

    #[error("inventory must contain at least one seat")]
    EmptyInventory,

    #[error("backing store unavailable: {0}")]
    BackingStoreUnavailable(#[source] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("commit for {target} was rejected: {reason}")]
    CommitFailure { target: String, reason: String },

    #[error("seat {0} is missing from the backing store")]
    SeatNotPersisted(u32),

    #[error("seat {0} has inconsistent booking state in the backing store")]
    InconsistentRow(i64),

    #[error("timed out after {0:?} waiting for the booking lock")]
    LockTimeout(Duration),

    #[error("backing store error: {0}")]
    Store(#[from] sqlx::Error),
}

impl BookingError {
    /// Ошибка вызывающей стороны (неверный номер места или пустое имя).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, BookingError::InvalidSeat { .. } | BookingError::InvalidUser)
    }

    /// Хранилище недоступно или занято: повторить запрос имеет смысл позже.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            BookingError::BackingStoreUnavailable(_) | BookingError::LockTimeout(_)
        )
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
