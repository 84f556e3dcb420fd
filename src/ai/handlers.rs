use axum::{extract::State, routing::post, Json, Router};
use tracing::{error, instrument};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{AnalyzeImageRequest, DescriptionResponse, DetectDamageRequest};
use super::services::{self, ConditionReport, DamageVerdict};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ai/detect-damage", post(detect_damage))
        .route("/ai/analyze-image", post(analyze_image))
}

#[instrument(skip(state, payload))]
pub async fn detect_damage(
    State(state): State<AppState>,
    Json(payload): Json<DetectDamageRequest>,
) -> Result<Json<DamageVerdict>, ApiError> {
    let (before, after) = match (&payload.before_image_url, &payload.after_image_url) {
        (Some(b), Some(a)) if !b.is_empty() && !a.is_empty() => (b, a),
        _ => {
            return Err(ApiError::BadRequest(
                "Both before and after images required".into(),
            ))
        }
    };

    let verdict = services::detect_damage(state.vision.as_ref(), before, after).await;
    Ok(Json(verdict))
}

#[instrument(skip(state, payload))]
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeImageRequest>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    let image_url = match payload.image_url.as_deref() {
        Some(u) if !u.is_empty() => u,
        _ => return Err(ApiError::BadRequest("Image URL required".into())),
    };

    match payload.action.as_deref() {
        Some("condition") => {
            let report: ConditionReport =
                services::analyze_item_condition(state.vision.as_ref(), image_url)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "condition analysis failed");
                        ApiError::Upstream("Analysis failed".into())
                    })?;
            Ok(Json(report).into_response())
        }
        Some("description") => {
            let description =
                services::generate_item_description(state.vision.as_ref(), image_url)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "description generation failed");
                        ApiError::Upstream("Analysis failed".into())
                    })?;
            Ok(Json(DescriptionResponse { description }).into_response())
        }
        _ => Err(ApiError::BadRequest("Invalid action".into())),
    }
}
