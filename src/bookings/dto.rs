use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo::Booking;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub pool_address: Option<String>,
    pub user: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub deposit_tx_hash: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking: Booking,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    pub user: Option<String>,
    pub pool_address: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub success: bool,
    pub booking: Booking,
    pub damaged: bool,
    pub report: String,
}
