use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{
    CreateProposalRequest, CreateProposalResponse, ProposalsQuery, ProposalsResponse, VoteRequest,
    VoteResponse,
};
use super::repo::{self, ProposalStatus};
use super::services::{resolved_status, voting_deadline};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/proposals", get(list_proposals))
        .route("/proposals/create", post(create_proposal))
        .route("/proposals/:id/vote", post(cast_vote))
}

#[instrument(skip(state, payload))]
pub async fn create_proposal(
    State(state): State<AppState>,
    Json(payload): Json<CreateProposalRequest>,
) -> Result<Json<CreateProposalResponse>, ApiError> {
    let (pool_address, proposer, title, description, kind) = match (
        payload.pool_address.as_deref(),
        payload.proposer.as_deref(),
        payload.title.as_deref(),
        payload.description.as_deref(),
        payload.kind,
    ) {
        (Some(p), Some(pr), Some(t), Some(d), Some(k))
            if !p.is_empty() && !pr.is_empty() && !t.is_empty() && !d.is_empty() =>
        {
            (p.to_lowercase(), pr.to_lowercase(), t, d, k)
        }
        _ => return Err(ApiError::BadRequest("Missing required fields".into())),
    };

    let end_date = voting_deadline(OffsetDateTime::now_utc(), payload.duration_days);

    let proposal = repo::insert(
        &state.db,
        &pool_address,
        &proposer,
        title,
        description,
        kind,
        end_date,
    )
    .await?;

    info!(proposal = %proposal.id, pool = %pool_address, "proposal created");
    Ok(Json(CreateProposalResponse {
        success: true,
        proposal,
    }))
}

#[instrument(skip(state))]
pub async fn list_proposals(
    State(state): State<AppState>,
    Query(q): Query<ProposalsQuery>,
) -> Result<Json<ProposalsResponse>, ApiError> {
    // overdue proposals are settled before anyone sees them
    let closed = repo::sweep_expired(&state.db).await?;
    if closed > 0 {
        debug!(closed, "settled overdue proposals");
    }

    let pool = q.pool_address.as_deref().map(|p| p.trim().to_lowercase());
    let proposals = repo::list(&state.db, pool.as_deref(), q.status.as_deref()).await?;
    Ok(Json(ProposalsResponse { proposals }))
}

#[instrument(skip(state, payload))]
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let (voter, support) = match (payload.voter.as_deref(), payload.support) {
        (Some(v), Some(s)) if !v.is_empty() => (v.to_lowercase(), s),
        _ => return Err(ApiError::BadRequest("Missing required fields".into())),
    };

    let proposal = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Proposal"))?;

    if proposal.status != ProposalStatus::Active {
        return Err(ApiError::BadRequest("Proposal is not active".into()));
    }
    if proposal.voters.contains(&voter) {
        return Err(ApiError::BadRequest("Already voted".into()));
    }

    // the guarded update is what actually enforces one-address-one-vote;
    // losing the race after the read above surfaces as a conflict
    let voted = match repo::record_vote(&state.db, id, &voter, support).await? {
        Some(p) => p,
        None => {
            warn!(proposal = %id, %voter, "vote lost the guard race");
            return Err(ApiError::Conflict("Already voted".into()));
        }
    };

    // votes cast after the deadline settle the proposal
    let proposal = if OffsetDateTime::now_utc() > voted.end_date {
        let outcome = resolved_status(voted.votes_for, voted.votes_against);
        repo::close(&state.db, id, outcome).await?.unwrap_or(voted)
    } else {
        voted
    };

    info!(proposal = %proposal.id, %voter, support, "vote recorded");
    Ok(Json(VoteResponse {
        success: true,
        proposal,
    }))
}
