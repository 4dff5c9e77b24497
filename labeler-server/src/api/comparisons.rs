//! Pairwise comparison endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use labeler_common::{DeleteResponse, PairwiseComparisonRecord, PairwiseCreate};
use tracing::info;

use super::ApiError;
use crate::{db, AppState};

/// GET /api/pairwise
pub async fn list_comparisons(
    State(state): State<AppState>,
) -> Result<Json<Vec<PairwiseComparisonRecord>>, ApiError> {
    Ok(Json(db::comparisons::list_comparisons(&state.db).await?))
}

/// POST /api/pairwise
///
/// One request stores one judgment (one reconstruction type).
pub async fn create_comparison(
    State(state): State<AppState>,
    payload: Result<Json<PairwiseCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<PairwiseComparisonRecord>), ApiError> {
    let Json(create) = payload?;
    create.validate()?;

    let record = db::comparisons::insert_comparison(&state.db, &create).await?;

    info!(
        id = record.id,
        reconstruction_type = %record.reconstruction_type,
        winner = %record.winner,
        "Saved pairwise comparison"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/pairwise/:id
pub async fn delete_comparison(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<DeleteResponse>), ApiError> {
    if db::comparisons::delete_comparison(&state.db, id).await? {
        info!(id, "Deleted pairwise comparison");
        Ok((
            StatusCode::OK,
            Json(DeleteResponse {
                success: true,
                message: Some("Comparison deleted successfully".to_string()),
            }),
        ))
    } else {
        Ok((
            StatusCode::NOT_FOUND,
            Json(DeleteResponse {
                success: false,
                message: Some("Comparison not found".to_string()),
            }),
        ))
    }
}
