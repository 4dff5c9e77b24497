//! Queries on the `labels` table

use std::collections::{BTreeMap, BTreeSet};

use labeler_common::{time, LabelRecord, LabelUpsert, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{decode_timestamp, encode_timestamp};

const SELECT_COLUMNS: &str = "SELECT file_path, file_name, reconstruction, reconstruction_scores,
        labeler_name, notes, updated_at
 FROM labels";

/// All labels, most recently updated first
pub async fn list_labels(pool: &SqlitePool) -> Result<Vec<LabelRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY updated_at DESC, rowid DESC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_label).collect()
}

/// All labels ordered by file name (CSV export order)
pub async fn list_labels_by_name(pool: &SqlitePool) -> Result<Vec<LabelRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY file_name, file_path", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_label).collect()
}

/// Label for one image, if any
pub async fn get_label(pool: &SqlitePool, file_path: &str) -> Result<Option<LabelRecord>> {
    let row = sqlx::query(&format!("{} WHERE file_path = ?", SELECT_COLUMNS))
        .bind(file_path)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_label).transpose()
}

/// Insert or replace the label for `upsert.file_path`
///
/// Orphan scores are dropped and empty collections stored as NULL.
pub async fn upsert_label(pool: &SqlitePool, upsert: &LabelUpsert) -> Result<()> {
    let (tags, scores) = upsert.normalized();

    let reconstruction = if tags.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&tags)?)
    };
    let reconstruction_scores = if scores.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&scores)?)
    };
    let now = encode_timestamp(time::now());

    sqlx::query(
        r#"
        INSERT INTO labels
            (file_path, file_name, reconstruction, reconstruction_scores,
             labeler_name, notes, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(file_path) DO UPDATE SET
            file_name = excluded.file_name,
            reconstruction = excluded.reconstruction,
            reconstruction_scores = excluded.reconstruction_scores,
            labeler_name = excluded.labeler_name,
            notes = excluded.notes,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&upsert.file_path)
    .bind(&upsert.file_name)
    .bind(reconstruction)
    .bind(reconstruction_scores)
    .bind(upsert.labeler_name.trim())
    .bind(upsert.normalized_notes())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the label for one image; returns whether a row was removed
pub async fn delete_label(pool: &SqlitePool, file_path: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM labels WHERE file_path = ?")
        .bind(file_path)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_label(row: &SqliteRow) -> Result<LabelRecord> {
    let reconstruction: BTreeSet<String> = match row.try_get::<Option<String>, _>(2)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => BTreeSet::new(),
    };
    let reconstruction_scores: BTreeMap<String, u8> = match row.try_get::<Option<String>, _>(3)? {
        Some(raw) => serde_json::from_str(&raw)?,
        None => BTreeMap::new(),
    };
    let updated_at: String = row.try_get(6)?;

    Ok(LabelRecord {
        file_path: row.try_get(0)?,
        file_name: row.try_get(1)?,
        reconstruction,
        reconstruction_scores,
        labeler_name: row.try_get::<Option<String>, _>(4)?.unwrap_or_default(),
        notes: row.try_get(5)?,
        updated_at: decode_timestamp(&updated_at)?,
    })
}
