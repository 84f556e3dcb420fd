use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;
use crate::users;

use super::dto::{
    BuySharesRequest, BuySharesResponse, CreatePoolRequest, CreatePoolResponse, PoolsQuery,
    PoolsResponse,
};
use super::repo::{self, Pool};
use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_pools))
        .route("/pools/create", post(create_pool))
        .route("/pools/:address", get(get_pool))
        .route("/pools/:address/buy-shares", post(buy_shares))
}

#[instrument(skip(state))]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(q): Query<PoolsQuery>,
) -> Result<Json<PoolsResponse>, ApiError> {
    let member = q.member.as_deref().map(|m| m.trim().to_lowercase());
    let pools = repo::list(
        &state.db,
        q.search.as_deref(),
        q.category.as_deref(),
        q.status.as_deref(),
        member.as_deref(),
        q.limit,
    )
    .await?;
    Ok(Json(PoolsResponse { pools }))
}

#[instrument(skip(state))]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Pool>, ApiError> {
    let pool = repo::find_by_address(&state.db, &address.to_lowercase())
        .await?
        .ok_or(ApiError::NotFound("Pool"))?;
    Ok(Json(pool))
}

#[instrument(skip(state, payload))]
pub async fn create_pool(
    State(state): State<AppState>,
    Json(payload): Json<CreatePoolRequest>,
) -> Result<Json<CreatePoolResponse>, ApiError> {
    let creator = match payload.creator.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_lowercase(),
        _ => return Err(ApiError::BadRequest("Creator address required".into())),
    };

    let (pool, metadata_uri) = services::create_pool(&state, &creator, &payload).await?;

    Ok(Json(CreatePoolResponse {
        success: true,
        pool_address: pool.address,
        pool_id: pool.id.to_string(),
        metadata_uri,
    }))
}

/// Records a confirmed share purchase in the mirror: membership only.
/// Funding totals are settled on-chain and not updated here.
#[instrument(skip(state, payload))]
pub async fn buy_shares(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(payload): Json<BuySharesRequest>,
) -> Result<Json<BuySharesResponse>, ApiError> {
    let address = address.to_lowercase();
    let buyer = match payload.buyer.as_deref().map(str::trim) {
        Some(b) if !b.is_empty() => b.to_lowercase(),
        _ => return Err(ApiError::BadRequest("Buyer address required".into())),
    };

    let existing = repo::find_by_address(&state.db, &address)
        .await?
        .ok_or(ApiError::NotFound("Pool"))?;

    let pool = match repo::add_member(&state.db, &address, &buyer).await? {
        Some(updated) => {
            users::repo::record_joined_pool(&state.db, &buyer, &address).await?;
            info!(pool = %address, %buyer, shares = ?payload.shares, "member joined pool");
            updated
        }
        // уже участник; покупка остаётся идемпотентной
        None => {
            warn!(pool = %address, %buyer, "buyer already a member");
            existing
        }
    };

    Ok(Json(BuySharesResponse {
        success: true,
        pool,
    }))
}
