use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::BookingError;
use crate::models::{Booking, Seat};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(list_seats))
        .route("/seats/{seat}/book", post(book_seat))
        .route("/seats/{seat}/cancel", post(cancel_seat))
        .route("/bookings", get(list_bookings))
        .route("/reset", post(reset_bookings))
}

/* ---------- helpers ---------- */

fn error_response(err: BookingError) -> (StatusCode, String) {
    if err.is_caller_error() {
        return (StatusCode::BAD_REQUEST, err.to_string());
    }
    if err.is_unavailable() {
        tracing::warn!("booking store unavailable: {}", err);
        return (StatusCode::SERVICE_UNAVAILABLE, err.to_string());
    }
    tracing::error!("booking operation failed: {:?}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "Booking operation failed".to_string())
}

/* ---------- SEATS ---------- */

#[derive(Debug, Serialize)]
struct SeatsResponse {
    total: u32,
    seats: Vec<Seat>,
}

// GET /api/seats
async fn list_seats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let seats = state.facade.seats().await.map_err(error_response)?;
    Ok(Json(SeatsResponse {
        total: state.facade.total_tickets(),
        seats,
    }))
}

// POST /api/seats/{seat}/book
#[derive(Debug, Deserialize)]
struct BookSeatRequest {
    user: String,
}

#[derive(Debug, Serialize)]
struct SeatActionResponse {
    seat: u32,
    booked: bool,
    message: String,
}

async fn book_seat(
    State(state): State<Arc<AppState>>,
    Path(seat): Path<u32>,
    Json(req): Json<BookSeatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let booked = state
        .facade
        .book(seat, &req.user)
        .await
        .map_err(error_response)?;

    if !booked {
        return Err((StatusCode::CONFLICT, format!("Seat {} is already booked!", seat)));
    }

    Ok(Json(SeatActionResponse {
        seat,
        booked: true,
        message: format!("Seat {} has been booked by {}!", seat, req.user),
    }))
}

// POST /api/seats/{seat}/cancel
async fn cancel_seat(
    State(state): State<Arc<AppState>>,
    Path(seat): Path<u32>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let cancelled = state.facade.cancel(seat).await.map_err(error_response)?;

    if !cancelled {
        return Err((StatusCode::CONFLICT, format!("Seat {} is not booked yet!", seat)));
    }

    Ok(Json(SeatActionResponse {
        seat,
        booked: false,
        message: format!("Booking for seat {} has been cancelled!", seat),
    }))
}

/* ---------- BOOKINGS ---------- */

// GET /api/bookings
async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, (StatusCode, String)> {
    state
        .facade
        .list_booked()
        .await
        .map(Json)
        .map_err(error_response)
}

// POST /api/reset
async fn reset_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.facade.reset().await.map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
