//! Database initialization
//!
//! Creates the label database on first run and brings the schema up on
//! every start. All statements are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the export and list endpoints read while a save is writing
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every table and index used by the server
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_labels_table(pool).await?;
    create_pairwise_table(pool).await?;
    Ok(())
}

/// Create the labels table
///
/// `reconstruction` holds a JSON array of tags and `reconstruction_scores`
/// a JSON object of tag to score; both are NULL when empty.
async fn create_labels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS labels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            file_path TEXT UNIQUE NOT NULL,
            file_name TEXT NOT NULL,
            reconstruction TEXT,
            reconstruction_scores TEXT,
            labeler_name TEXT,
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_labels_updated_at ON labels(updated_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_pairwise_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pairwise_comparisons (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            image1_path TEXT NOT NULL,
            image1_name TEXT NOT NULL,
            image2_path TEXT NOT NULL,
            image2_name TEXT NOT NULL,
            reconstruction_type TEXT NOT NULL,
            winner TEXT NOT NULL CHECK (winner IN ('1', '2', 'tie', 'not_apply')),
            labeler_name TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
