use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "pool_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PoolStatus {
    Funding,
    Active,
    Closed,
}

/// Local mirror of a deployed pool contract. The row is written only
/// after the on-chain deploy confirmed; `address` is the contract
/// address, lowercased.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: Uuid,
    pub address: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub images: Vec<String>,
    pub total_shares: i64,
    pub share_price: f64,
    pub maintenance_pct: i32,
    pub deposit_amount: f64,
    pub max_booking_days: i32,
    pub creator: String,
    pub members: Vec<String>,
    pub current_funding: f64,
    pub status: PoolStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewPool<'a> {
    pub address: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub category: &'a str,
    pub location: &'a str,
    pub images: &'a [String],
    pub total_shares: i64,
    pub share_price: f64,
    pub maintenance_pct: i32,
    pub deposit_amount: f64,
    pub max_booking_days: i32,
    pub creator: &'a str,
}

pub async fn find_by_address(db: &PgPool, address: &str) -> anyhow::Result<Option<Pool>> {
    let pool = sqlx::query_as::<_, Pool>(
        r#"
        SELECT id, address, title, description, category, location, images,
               total_shares, share_price, maintenance_pct, deposit_amount,
               max_booking_days, creator, members, current_funding, status, created_at
        FROM pools
        WHERE address = $1
        "#,
    )
    .bind(address)
    .fetch_optional(db)
    .await
    .context("find pool by address")?;
    Ok(pool)
}

pub async fn list(
    db: &PgPool,
    search: Option<&str>,
    category: Option<&str>,
    status: Option<&str>,
    member: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Pool>> {
    let pools = sqlx::query_as::<_, Pool>(
        r#"
        SELECT id, address, title, description, category, location, images,
               total_shares, share_price, maintenance_pct, deposit_amount,
               max_booking_days, creator, members, current_funding, status, created_at
        FROM pools
        WHERE ($1::text IS NULL
               OR title ILIKE '%' || $1 || '%'
               OR description ILIKE '%' || $1 || '%'
               OR location ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category = $2)
          AND ($3::text IS NULL OR status::text = $3)
          AND ($4::text IS NULL OR $4 = ANY(members))
        ORDER BY created_at DESC
        LIMIT $5
        "#,
    )
    .bind(search)
    .bind(category)
    .bind(status)
    .bind(member)
    .bind(limit)
    .fetch_all(db)
    .await
    .context("list pools")?;
    Ok(pools)
}

pub async fn insert(db: &PgPool, new: NewPool<'_>) -> anyhow::Result<Pool> {
    let pool = sqlx::query_as::<_, Pool>(
        r#"
        INSERT INTO pools (id, address, title, description, category, location, images,
                           total_shares, share_price, maintenance_pct, deposit_amount,
                           max_booking_days, creator)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING id, address, title, description, category, location, images,
                  total_shares, share_price, maintenance_pct, deposit_amount,
                  max_booking_days, creator, members, current_funding, status, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.address)
    .bind(new.title)
    .bind(new.description)
    .bind(new.category)
    .bind(new.location)
    .bind(new.images)
    .bind(new.total_shares)
    .bind(new.share_price)
    .bind(new.maintenance_pct)
    .bind(new.deposit_amount)
    .bind(new.max_booking_days)
    .bind(new.creator)
    .fetch_one(db)
    .await
    .context("insert pool")?;
    Ok(pool)
}

/// Set-style membership add. Returns `None` when the buyer is already a
/// member, so concurrent purchases cannot produce duplicates.
pub async fn add_member(
    db: &PgPool,
    address: &str,
    buyer: &str,
) -> anyhow::Result<Option<Pool>> {
    let pool = sqlx::query_as::<_, Pool>(
        r#"
        UPDATE pools
        SET members = array_append(members, $2)
        WHERE address = $1 AND NOT ($2 = ANY(members))
        RETURNING id, address, title, description, category, location, images,
                  total_shares, share_price, maintenance_pct, deposit_amount,
                  max_booking_days, creator, members, current_funding, status, created_at
        "#,
    )
    .bind(address)
    .bind(buyer)
    .fetch_optional(db)
    .await
    .context("add pool member")?;
    Ok(pool)
}
