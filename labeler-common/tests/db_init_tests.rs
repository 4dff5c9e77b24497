//! Tests for database creation and schema setup

use labeler_common::db::init::init_database;

async fn table_exists(pool: &sqlx::SqlitePool, name: &str) -> bool {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();
    count == 1
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("nested").join("labels.db");

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("labels.db");

    let first = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO labels (file_path, file_name, created_at, updated_at)
         VALUES ('a.png', 'a.png', '2025-01-01T00:00:00Z', '2025-01-01T00:00:00Z')",
    )
    .execute(&first)
    .await
    .unwrap();
    first.close().await;

    // Re-initializing must keep existing rows
    let second = init_database(&db_path).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM labels")
        .fetch_one(&second)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_schema_tables_created() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("labels.db")).await.unwrap();

    assert!(table_exists(&pool, "labels").await);
    assert!(table_exists(&pool, "pairwise_comparisons").await);
}

#[tokio::test]
async fn test_winner_check_constraint() {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("labels.db")).await.unwrap();

    let result = sqlx::query(
        "INSERT INTO pairwise_comparisons
            (image1_path, image1_name, image2_path, image2_name,
             reconstruction_type, winner, labeler_name, created_at)
         VALUES ('a.png', 'a.png', 'b.png', 'b.png', 'dense', 'draw', 'bob',
                 '2025-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "Unknown winner value should be rejected");
}
