use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

/// A time-boxed reservation of a pool's item. Bookings start `pending`
/// and become `active` once check-in photos have been processed;
/// check-out handling lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub pool_address: String,
    #[serde(rename = "user")]
    pub user_address: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    pub deposit_tx_hash: String,
    pub check_in_images: Vec<String>,
    pub check_out_images: Vec<String>,
    pub damage_detected: bool,
    pub damage_report: Option<String>,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    pool_address: &str,
    user_address: &str,
    start_date: OffsetDateTime,
    end_date: OffsetDateTime,
    deposit_tx_hash: &str,
) -> anyhow::Result<Booking> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (id, pool_address, user_address, start_date, end_date, deposit_tx_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, pool_address, user_address, start_date, end_date, deposit_tx_hash,
                  check_in_images, check_out_images, damage_detected, damage_report,
                  status, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(pool_address)
    .bind(user_address)
    .bind(start_date)
    .bind(end_date)
    .bind(deposit_tx_hash)
    .fetch_one(db)
    .await
    .context("insert booking")?;
    Ok(booking)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, pool_address, user_address, start_date, end_date, deposit_tx_hash,
               check_in_images, check_out_images, damage_detected, damage_report,
               status, created_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find booking by id")?;
    Ok(booking)
}

pub async fn list(
    db: &PgPool,
    user: Option<&str>,
    pool_address: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let bookings = sqlx::query_as::<_, Booking>(
        r#"
        SELECT id, pool_address, user_address, start_date, end_date, deposit_tx_hash,
               check_in_images, check_out_images, damage_detected, damage_report,
               status, created_at
        FROM bookings
        WHERE ($1::text IS NULL OR user_address = $1)
          AND ($2::text IS NULL OR pool_address = $2)
          AND ($3::text IS NULL OR status::text = $3)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user)
    .bind(pool_address)
    .bind(status)
    .fetch_all(db)
    .await
    .context("list bookings")?;
    Ok(bookings)
}

/// Store the check-in evidence and move the booking to `active` in one
/// statement, whatever the damage verdict was.
pub async fn record_check_in(
    db: &PgPool,
    id: Uuid,
    images: &[String],
    damage_detected: bool,
    damage_report: Option<&str>,
) -> anyhow::Result<Option<Booking>> {
    let booking = sqlx::query_as::<_, Booking>(
        r#"
        UPDATE bookings
        SET check_in_images = $2,
            damage_detected = $3,
            damage_report = $4,
            status = 'active'
        WHERE id = $1
        RETURNING id, pool_address, user_address, start_date, end_date, deposit_tx_hash,
                  check_in_images, check_out_images, damage_detected, damage_report,
                  status, created_at
        "#,
    )
    .bind(id)
    .bind(images)
    .bind(damage_detected)
    .bind(damage_report)
    .fetch_optional(db)
    .await
    .context("record check-in")?;
    Ok(booking)
}
