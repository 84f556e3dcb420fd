use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A platform account keyed by its lowercase wallet address. Rows are
/// minted lazily the first time an address shows up.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub address: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub created_pools: i32,
    pub joined_pools: Vec<String>,
    pub bookings: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub async fn find_by_address(db: &PgPool, address: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT address, username, email, created_pools, joined_pools, bookings, created_at
        FROM users
        WHERE address = $1
        "#,
    )
    .bind(address)
    .fetch_optional(db)
    .await
    .context("find user by address")?;
    Ok(user)
}

/// Upsert-read: returns the existing row or creates a bare one.
pub async fn get_or_create(db: &PgPool, address: &str) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (address)
        VALUES ($1)
        ON CONFLICT (address) DO UPDATE SET address = EXCLUDED.address
        RETURNING address, username, email, created_pools, joined_pools, bookings, created_at
        "#,
    )
    .bind(address)
    .fetch_one(db)
    .await
    .context("get or create user")?;
    Ok(user)
}

pub async fn upsert_profile(
    db: &PgPool,
    address: &str,
    username: Option<&str>,
    email: Option<&str>,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (address, username, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (address) DO UPDATE
        SET username = COALESCE($2, users.username),
            email = COALESCE($3, users.email)
        RETURNING address, username, email, created_pools, joined_pools, bookings, created_at
        "#,
    )
    .bind(address)
    .bind(username)
    .bind(email)
    .fetch_one(db)
    .await
    .context("upsert user profile")?;
    Ok(user)
}

/// True when another account already claimed this email.
pub async fn email_taken(db: &PgPool, email: &str, address: &str) -> anyhow::Result<bool> {
    let (taken,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (SELECT 1 FROM users WHERE email = $1 AND address <> $2)
        "#,
    )
    .bind(email)
    .bind(address)
    .fetch_one(db)
    .await
    .context("check email uniqueness")?;
    Ok(taken)
}

pub async fn credit_pool_creation(
    db: &PgPool,
    address: &str,
    pool_address: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET created_pools = created_pools + 1,
            joined_pools = array_append(joined_pools, $2)
        WHERE address = $1
        "#,
    )
    .bind(address)
    .bind(pool_address)
    .execute(db)
    .await
    .context("credit pool creation")?;
    Ok(())
}

/// Set-style append: the pool lands in `joined_pools` at most once,
/// minting the user row when needed.
pub async fn record_joined_pool(
    db: &PgPool,
    address: &str,
    pool_address: &str,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (address, joined_pools)
        VALUES ($1, ARRAY[$2]::text[])
        ON CONFLICT (address) DO UPDATE
        SET joined_pools = array_append(users.joined_pools, $2)
        WHERE NOT ($2 = ANY(users.joined_pools))
        "#,
    )
    .bind(address)
    .bind(pool_address)
    .execute(db)
    .await
    .context("record joined pool")?;
    Ok(())
}

pub async fn record_booking(db: &PgPool, address: &str, booking_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (address, bookings)
        VALUES ($1, ARRAY[$2]::uuid[])
        ON CONFLICT (address) DO UPDATE
        SET bookings = array_append(users.bookings, $2)
        "#,
    )
    .bind(address)
    .bind(booking_id)
    .execute(db)
    .await
    .context("record booking")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_camel_case() {
        let user = User {
            address: "0x00000000000000000000000000000000000000aa".into(),
            username: Some("alice".into()),
            email: None,
            created_pools: 1,
            joined_pools: vec!["0x00000000000000000000000000000000000000bb".into()],
            bookings: vec![],
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["createdPools"], 1);
        assert!(json["joinedPools"].is_array());
        assert!(json.get("created_pools").is_none());
    }
}
