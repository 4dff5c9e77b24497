//! Image catalog and image byte endpoints

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use labeler_common::{paths::resolve_under, ImageDescriptor};
use tracing::{debug, info};

use super::ApiError;
use crate::{catalog, AppState};

/// GET /api/images
///
/// Rescans the data directory on every call.
pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageDescriptor>>, ApiError> {
    let data_dir = state.data_dir.clone();
    let images = tokio::task::spawn_blocking(move || catalog::scan_images(&data_dir))
        .await
        .map_err(|e| ApiError::Internal(format!("Catalog scan aborted: {}", e)))??;

    info!("Catalog scan found {} images", images.len());
    Ok(Json(images))
}

/// GET /api/images/*path
///
/// The wildcard arrives percent-decoded; each segment was encoded
/// separately by the client.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(image_path): Path<String>,
) -> Result<Response, ApiError> {
    let image_path = image_path.trim_start_matches('/');

    let full_path = resolve_under(&state.data_dir, image_path)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid image path: {}", image_path)))?;

    if !catalog::is_image(&full_path) || !full_path.is_file() {
        return Err(ApiError::NotFound(format!("Image not found: {}", image_path)));
    }

    let bytes = tokio::fs::read(&full_path)
        .await
        .map_err(|e| ApiError::Internal(format!("Error serving image {}: {}", image_path, e)))?;

    debug!("Serving {} ({} bytes)", image_path, bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, catalog::content_type(&full_path)),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}
