use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "proposal_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Active,
    Passed,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "proposal_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProposalKind {
    Maintenance,
    Rule,
    Upgrade,
    Other,
}

/// A governance item put to the pool's members. One address, one vote;
/// the outcome is a pure function of the two counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    pub pool_address: String,
    pub proposer: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ProposalKind,
    pub votes_for: i32,
    pub votes_against: i32,
    pub voters: Vec<String>,
    pub status: ProposalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
}

pub async fn insert(
    db: &PgPool,
    pool_address: &str,
    proposer: &str,
    title: &str,
    description: &str,
    kind: ProposalKind,
    end_date: OffsetDateTime,
) -> anyhow::Result<Proposal> {
    let proposal = sqlx::query_as::<_, Proposal>(
        r#"
        INSERT INTO proposals (id, pool_address, proposer, title, description, kind, end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, pool_address, proposer, title, description, kind,
                  votes_for, votes_against, voters, status, created_at, end_date
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(pool_address)
    .bind(proposer)
    .bind(title)
    .bind(description)
    .bind(kind)
    .bind(end_date)
    .fetch_one(db)
    .await
    .context("insert proposal")?;
    Ok(proposal)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Proposal>> {
    let proposal = sqlx::query_as::<_, Proposal>(
        r#"
        SELECT id, pool_address, proposer, title, description, kind,
               votes_for, votes_against, voters, status, created_at, end_date
        FROM proposals
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find proposal by id")?;
    Ok(proposal)
}

pub async fn list(
    db: &PgPool,
    pool_address: Option<&str>,
    status: Option<&str>,
) -> anyhow::Result<Vec<Proposal>> {
    let proposals = sqlx::query_as::<_, Proposal>(
        r#"
        SELECT id, pool_address, proposer, title, description, kind,
               votes_for, votes_against, voters, status, created_at, end_date
        FROM proposals
        WHERE ($1::text IS NULL OR pool_address = $1)
          AND ($2::text IS NULL OR status::text = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(pool_address)
    .bind(status)
    .fetch_all(db)
    .await
    .context("list proposals")?;
    Ok(proposals)
}

/// Count a vote in one guarded statement: the voter is appended and
/// exactly one counter bumped only while the proposal is still active
/// and the address has not voted. `None` means the guard failed.
pub async fn record_vote(
    db: &PgPool,
    id: Uuid,
    voter: &str,
    support: bool,
) -> anyhow::Result<Option<Proposal>> {
    let proposal = sqlx::query_as::<_, Proposal>(
        r#"
        UPDATE proposals
        SET voters = array_append(voters, $2),
            votes_for = votes_for + CASE WHEN $3 THEN 1 ELSE 0 END,
            votes_against = votes_against + CASE WHEN $3 THEN 0 ELSE 1 END
        WHERE id = $1 AND status = 'active' AND NOT ($2 = ANY(voters))
        RETURNING id, pool_address, proposer, title, description, kind,
                  votes_for, votes_against, voters, status, created_at, end_date
        "#,
    )
    .bind(id)
    .bind(voter)
    .bind(support)
    .fetch_optional(db)
    .await
    .context("record vote")?;
    Ok(proposal)
}

/// Close an overdue proposal with the given outcome. Guarded so it only
/// applies once and only after the deadline; `None` when it is not yet
/// due or already closed.
pub async fn close(
    db: &PgPool,
    id: Uuid,
    status: ProposalStatus,
) -> anyhow::Result<Option<Proposal>> {
    let proposal = sqlx::query_as::<_, Proposal>(
        r#"
        UPDATE proposals
        SET status = $2
        WHERE id = $1 AND status = 'active' AND end_date < now()
        RETURNING id, pool_address, proposer, title, description, kind,
                  votes_for, votes_against, voters, status, created_at, end_date
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await
    .context("close proposal")?;
    Ok(proposal)
}

/// Deadline sweep run before reads so stale `active` proposals cannot
/// linger forever waiting for a vote that never comes.
pub async fn sweep_expired(db: &PgPool) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE proposals
        SET status = CASE WHEN votes_for > votes_against
                          THEN 'passed'::proposal_status
                          ELSE 'rejected'::proposal_status END
        WHERE status = 'active' AND end_date < now()
        "#,
    )
    .execute(db)
    .await
    .context("sweep expired proposals")?;
    Ok(result.rows_affected())
}
