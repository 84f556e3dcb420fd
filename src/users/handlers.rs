use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{UpdateUserRequest, UserQuery};
use super::repo::{self, User};
use super::services::{is_valid_address, is_valid_email};

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/user", get(get_user).patch(update_user))
}

/// GET /api/auth/user?address=0x...
///
/// First sight of an address mints a bare account row.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> Result<Json<User>, ApiError> {
    let address = match q.address.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a.to_lowercase(),
        _ => return Err(ApiError::BadRequest("Address required".into())),
    };

    if !is_valid_address(&address) {
        warn!(%address, "malformed wallet address");
        return Err(ApiError::BadRequest("Invalid address".into()));
    }

    let user = repo::get_or_create(&state.db, &address).await?;
    Ok(Json(user))
}

/// PATCH /api/auth/user
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let address = match payload.address.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a.to_lowercase(),
        _ => return Err(ApiError::BadRequest("Address required".into())),
    };

    if !is_valid_address(&address) {
        warn!(%address, "malformed wallet address");
        return Err(ApiError::BadRequest("Invalid address".into()));
    }

    let username = payload
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    if let Some(email) = email.as_deref() {
        if !is_valid_email(email) {
            warn!(%address, "invalid email on profile update");
            return Err(ApiError::BadRequest("Invalid email".into()));
        }
        if repo::email_taken(&state.db, email, &address).await? {
            warn!(%address, "email already in use");
            return Err(ApiError::Conflict("Email already in use".into()));
        }
    }

    let user = repo::upsert_profile(&state.db, &address, username, email.as_deref()).await?;
    info!(%address, "user profile updated");
    Ok(Json(user))
}
