use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{error, info, instrument, warn};

use crate::error::ApiError;
use crate::state::AppState;

use super::dto::UploadResponse;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /api/upload (multipart, field `file`)
#[instrument(skip(state, mp))]
pub async fn upload_file(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, String, Bytes)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "upload.bin".into());
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field.bytes().await.map_err(|e| {
                warn!(error = %e, "multipart read failed");
                ApiError::BadRequest("Invalid file upload".into())
            })?;
            file = Some((filename, content_type, data));
        }
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".into()))?;

    let ipfs_url = state
        .pinner
        .pin_file(&filename, data, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, %filename, "pin failed");
            ApiError::Upstream("Upload failed".into())
        })?;

    info!(%filename, %ipfs_url, "file pinned");
    Ok(Json(UploadResponse { ipfs_url }))
}

#[cfg(test)]
mod tests {
    use crate::state::AppState;

    #[tokio::test]
    async fn fake_pinner_preserves_filename_in_url() {
        let state = AppState::fake();
        let url = state
            .pinner
            .pin_file("photo.jpg", bytes::Bytes::from_static(b"abc"), "image/jpeg")
            .await
            .unwrap();
        assert!(url.contains("photo.jpg"));
    }
}
