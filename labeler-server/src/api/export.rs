//! CSV export of labels and comparisons

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use labeler_common::{LabelRecord, PairwiseComparisonRecord};
use tracing::info;

use super::ApiError;
use crate::{db, AppState};

const LABELS_HEADER: &[&str] = &[
    "File",
    "Path",
    "Reconstruction",
    "Scores",
    "Labeler",
    "Notes",
    "Updated",
];

const COMPARISONS_HEADER: &[&str] = &[
    "Image 1",
    "Image 2",
    "Reconstruction Type",
    "Winner",
    "Labeler",
    "Notes",
    "Created",
];

/// GET /api/labels/export
pub async fn export_labels(State(state): State<AppState>) -> Result<Response, ApiError> {
    let labels = db::labels::list_labels_by_name(&state.db).await?;
    info!("Exporting {} labels as CSV", labels.len());
    Ok(csv_response("labels.csv", labels_csv(&labels)))
}

/// GET /api/pairwise/export
pub async fn export_comparisons(State(state): State<AppState>) -> Result<Response, ApiError> {
    let comparisons = db::comparisons::list_comparisons_oldest_first(&state.db).await?;
    info!("Exporting {} comparisons as CSV", comparisons.len());
    Ok(csv_response("pairwise_comparisons.csv", comparisons_csv(&comparisons)))
}

/// Render labels, one row per image
pub fn labels_csv(labels: &[LabelRecord]) -> String {
    let mut out = csv_line(LABELS_HEADER.iter().copied());
    for label in labels {
        out.push_str(&csv_line([
            label.file_name.as_str(),
            label.file_path.as_str(),
            or_dash(&label.reconstruction_summary()),
            or_dash(&label.scores_summary()),
            or_dash(&label.labeler_name),
            or_dash(label.notes.as_deref().unwrap_or_default()),
            label.updated_at.to_rfc3339().as_str(),
        ]));
    }
    out
}

/// Render comparisons, one row per judgment
pub fn comparisons_csv(comparisons: &[PairwiseComparisonRecord]) -> String {
    let mut out = csv_line(COMPARISONS_HEADER.iter().copied());
    for c in comparisons {
        out.push_str(&csv_line([
            c.image1_name.as_str(),
            c.image2_name.as_str(),
            c.reconstruction_type.as_str(),
            c.winner.as_str(),
            or_dash(&c.labeler_name),
            or_dash(c.notes.as_deref().unwrap_or_default()),
            c.created_at.to_rfc3339().as_str(),
        ]));
    }
    out
}

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn csv_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let mut line = fields
        .into_iter()
        .map(csv_field)
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Quote a field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
