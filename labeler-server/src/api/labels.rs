//! Absolute label endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use labeler_common::{DeleteResponse, LabelRecord, LabelUpsert};
use serde_json::{json, Value};
use tracing::info;

use super::ApiError;
use crate::{db, AppState};

/// GET /api/labels
pub async fn list_labels(
    State(state): State<AppState>,
) -> Result<Json<Vec<LabelRecord>>, ApiError> {
    Ok(Json(db::labels::list_labels(&state.db).await?))
}

/// GET /api/labels/*path
///
/// Returns an object of nulls when the image has no label, so callers can
/// treat "unlabeled" without an error path.
pub async fn get_label(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let file_path = file_path.trim_start_matches('/');

    match db::labels::get_label(&state.db, file_path).await? {
        Some(record) => Ok(Json(
            serde_json::to_value(record).map_err(|e| ApiError::Internal(e.to_string()))?,
        )),
        None => Ok(Json(json!({
            "reconstruction": null,
            "reconstruction_scores": null,
            "labeler_name": null,
            "notes": null,
        }))),
    }
}

/// POST /api/labels
pub async fn save_label(
    State(state): State<AppState>,
    payload: Result<Json<LabelUpsert>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(upsert) = payload?;
    upsert.validate()?;

    db::labels::upsert_label(&state.db, &upsert).await?;

    info!(
        file_path = %upsert.file_path,
        labeler = %upsert.labeler_name.trim(),
        "Saved label"
    );

    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/labels/*path
pub async fn delete_label(
    State(state): State<AppState>,
    Path(file_path): Path<String>,
) -> Result<(StatusCode, Json<DeleteResponse>), ApiError> {
    let file_path = file_path.trim_start_matches('/');

    if db::labels::delete_label(&state.db, file_path).await? {
        info!(file_path = %file_path, "Deleted label");
        Ok((
            StatusCode::OK,
            Json(DeleteResponse {
                success: true,
                message: Some("Label deleted successfully".to_string()),
            }),
        ))
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(DeleteResponse {
                success: false,
                message: Some("Label not found".to_string()),
            }),
        ))
    }
}
