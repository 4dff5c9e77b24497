//! Queries on the `pairwise_comparisons` table

use labeler_common::{time, PairwiseComparisonRecord, PairwiseCreate, Result, Winner};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::{decode_timestamp, encode_timestamp};

const SELECT_COLUMNS: &str = "SELECT id, image1_path, image1_name, image2_path, image2_name,
        reconstruction_type, winner, labeler_name, notes, created_at
 FROM pairwise_comparisons";

/// All comparisons, newest first
pub async fn list_comparisons(pool: &SqlitePool) -> Result<Vec<PairwiseComparisonRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY id DESC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_comparison).collect()
}

/// All comparisons in creation order (CSV export order)
pub async fn list_comparisons_oldest_first(
    pool: &SqlitePool,
) -> Result<Vec<PairwiseComparisonRecord>> {
    let rows = sqlx::query(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(row_to_comparison).collect()
}

/// Store one judgment and return it with its assigned id
pub async fn insert_comparison(
    pool: &SqlitePool,
    create: &PairwiseCreate,
) -> Result<PairwiseComparisonRecord> {
    let created_at = time::now();
    let notes = create
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let result = sqlx::query(
        r#"
        INSERT INTO pairwise_comparisons
            (image1_path, image1_name, image2_path, image2_name,
             reconstruction_type, winner, labeler_name, notes, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&create.image1_path)
    .bind(&create.image1_name)
    .bind(&create.image2_path)
    .bind(&create.image2_name)
    .bind(create.reconstruction_type.trim())
    .bind(create.winner.as_str())
    .bind(create.labeler_name.trim())
    .bind(&notes)
    .bind(encode_timestamp(created_at))
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
        .bind(id)
        .fetch_one(pool)
        .await?;

    row_to_comparison(&row)
}

/// Delete one comparison; returns whether a row was removed
pub async fn delete_comparison(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM pairwise_comparisons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn row_to_comparison(row: &SqliteRow) -> Result<PairwiseComparisonRecord> {
    let winner: String = row.try_get(6)?;
    let created_at: String = row.try_get(9)?;

    Ok(PairwiseComparisonRecord {
        id: row.try_get(0)?,
        image1_path: row.try_get(1)?,
        image1_name: row.try_get(2)?,
        image2_path: row.try_get(3)?,
        image2_name: row.try_get(4)?,
        reconstruction_type: row.try_get(5)?,
        winner: winner.parse::<Winner>()?,
        labeler_name: row.try_get(7)?,
        notes: row.try_get(8)?,
        created_at: decode_timestamp(&created_at)?,
    })
}
