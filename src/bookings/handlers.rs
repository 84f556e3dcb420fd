use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::pools;
use crate::state::AppState;
use crate::users;

use super::dto::{
    BookingsQuery, BookingsResponse, CheckInRequest, CheckInResponse, CreateBookingRequest,
    CreateBookingResponse,
};
use super::repo;
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/create", post(create_booking))
        .route("/bookings/:id/checkin", post(check_in))
}

#[instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(q): Query<BookingsQuery>,
) -> Result<Json<BookingsResponse>, ApiError> {
    let user = q.user.as_deref().map(|u| u.trim().to_lowercase());
    let pool = q.pool_address.as_deref().map(|p| p.trim().to_lowercase());

    let bookings = repo::list(&state.db, user.as_deref(), pool.as_deref(), q.status.as_deref())
        .await?;
    Ok(Json(BookingsResponse { bookings }))
}

#[instrument(skip(state, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<CreateBookingResponse>, ApiError> {
    let (pool_address, user, start_date, end_date, deposit_tx_hash) = match (
        payload.pool_address.as_deref(),
        payload.user.as_deref(),
        payload.start_date,
        payload.end_date,
        payload.deposit_tx_hash.as_deref(),
    ) {
        (Some(p), Some(u), Some(s), Some(e), Some(d))
            if !p.is_empty() && !u.is_empty() && !d.is_empty() =>
        {
            (p.to_lowercase(), u.to_lowercase(), s, e, d)
        }
        _ => return Err(ApiError::BadRequest("Missing required fields".into())),
    };

    if end_date <= start_date {
        warn!(%pool_address, %user, "booking window rejected");
        return Err(ApiError::BadRequest(
            "endDate must be after startDate".into(),
        ));
    }

    pools::repo::find_by_address(&state.db, &pool_address)
        .await?
        .ok_or(ApiError::NotFound("Pool"))?;

    let booking = repo::insert(
        &state.db,
        &pool_address,
        &user,
        start_date,
        end_date,
        deposit_tx_hash,
    )
    .await?;

    users::repo::record_booking(&state.db, &user, booking.id).await?;

    info!(booking = %booking.id, %pool_address, %user, "booking created");
    Ok(Json(CreateBookingResponse {
        success: true,
        booking,
    }))
}

/// POST /api/bookings/:id/checkin { images: [...] }
#[instrument(skip(state, payload))]
pub async fn check_in(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    if payload.images.is_empty() {
        return Err(ApiError::BadRequest("Images required".into()));
    }

    let outcome = services::perform_check_in(&state, id, payload.images).await?;

    Ok(Json(CheckInResponse {
        success: true,
        booking: outcome.booking,
        damaged: outcome.damaged,
        report: outcome.report,
    }))
}
