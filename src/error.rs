use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request-level errors returned as `{"error": "..."}` JSON bodies.
///
/// 5xx details are logged, never leaked to the client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Pool creation limit reached. Please upgrade.")]
    PoolLimitReached,

    /// A collaborator (vision, pinning, chain RPC) failed; the message is
    /// the generic client-facing one, the cause is logged at the call site.
    #[error("{0}")]
    Upstream(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{} not found", what) }),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::PoolLimitReached => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Pool creation limit reached. Please upgrade.",
                    "needsUpgrade": true
                }),
            ),
            ApiError::Upstream(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Database error" }),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_formats_entity_name() {
        let resp = ApiError::NotFound("Pool").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Pool not found");
    }

    #[tokio::test]
    async fn pool_limit_carries_upgrade_flag() {
        let resp = ApiError::PoolLimitReached.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = body_json(resp).await;
        assert_eq!(body["needsUpgrade"], true);
        assert!(body["error"].as_str().unwrap().contains("limit reached"));
    }

    #[tokio::test]
    async fn internal_error_is_not_leaked() {
        let resp = ApiError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert!(!body["error"].as_str().unwrap().contains("secret"));
    }
}
