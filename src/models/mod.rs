pub mod seat;

pub use seat::{Booking, Seat, SeatState};
