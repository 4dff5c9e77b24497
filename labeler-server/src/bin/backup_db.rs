//! labeler-backup - snapshot the label database
//!
//! Writes `<root>/backups/labels_backup_<YYYYmmdd_HHMMSS>.db` and keeps
//! only the newest backups.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use labeler_common::config::{database_path, resolve_root_folder, BACKUP_DIR, ROOT_FOLDER_ENV};
use labeler_common::time::file_stamp;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use tracing::info;

const BACKUP_PREFIX: &str = "labels_backup_";

#[derive(Parser, Debug)]
#[command(name = "labeler-backup")]
#[command(about = "Back up the image label database")]
#[command(version)]
struct Args {
    /// Root folder holding labels.db (overrides env and config file)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Number of backups to keep
    #[arg(short, long, default_value = "10")]
    keep: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    let db_path = database_path(&root_folder);

    if !db_path.exists() {
        info!("No database file found at {}. Nothing to backup.", db_path.display());
        return Ok(());
    }

    let backup_dir = root_folder.join(BACKUP_DIR);
    std::fs::create_dir_all(&backup_dir)
        .with_context(|| format!("Failed to create {}", backup_dir.display()))?;

    let backup_path = backup_dir.join(format!("{}{}.db", BACKUP_PREFIX, file_stamp()));
    snapshot(&db_path, &backup_path).await?;

    info!("✓ Database backed up to: {}", backup_path.display());
    info!("  Original size: {:.2} KB", size_kib(&db_path)?);
    info!("  Backup size: {:.2} KB", size_kib(&backup_path)?);

    for removed in prune_backups(&backup_dir, args.keep)? {
        info!("  Removed old backup: {}", removed.display());
    }

    Ok(())
}

/// Copy the live database with `VACUUM INTO`, which also captures pages
/// still sitting in the WAL
async fn snapshot(db_path: &Path, backup_path: &Path) -> Result<()> {
    let mut conn = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true)
        .connect()
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    sqlx::query("VACUUM INTO ?")
        .bind(backup_path.to_string_lossy().into_owned())
        .execute(&mut conn)
        .await
        .context("VACUUM INTO failed")?;

    conn.close().await?;
    Ok(())
}

/// Delete all but the newest `keep` backups; returns the removed paths
fn prune_backups(backup_dir: &Path, keep: usize) -> Result<Vec<PathBuf>> {
    let mut backups: Vec<PathBuf> = std::fs::read_dir(backup_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".db"))
                .unwrap_or(false)
        })
        .collect();

    // Stamped names sort chronologically; newest first
    backups.sort();
    backups.reverse();

    let stale = backups.split_off(keep.min(backups.len()));
    for path in &stale {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(stale)
}

fn size_kib(path: &Path) -> Result<f64> {
    Ok(std::fs::metadata(path)?.len() as f64 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        for stamp in ["20250101_000000", "20250102_000000", "20250103_000000"] {
            std::fs::write(dir.path().join(format!("{}{}.db", BACKUP_PREFIX, stamp)), b"").unwrap();
        }
        std::fs::write(dir.path().join("unrelated.db"), b"").unwrap();

        let removed = prune_backups(dir.path(), 2).unwrap();

        assert_eq!(removed.len(), 1);
        assert!(removed[0].ends_with("labels_backup_20250101_000000.db"));
        assert!(dir.path().join("unrelated.db").exists());
        assert!(dir.path().join("labels_backup_20250103_000000.db").exists());
    }

    #[test]
    fn test_prune_with_fewer_backups_than_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("labels_backup_20250101_000000.db"), b"").unwrap();

        assert!(prune_backups(dir.path(), 10).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_copies_rows() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("labels.db");
        let pool = labeler_common::db::init_database(&db_path).await.unwrap();
        sqlx::query(
            "INSERT INTO labels (file_path, file_name, created_at, updated_at)
             VALUES ('a.png', 'a.png', '2025-01-01T00:00:00.000000Z', '2025-01-01T00:00:00.000000Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let backup = dir.path().join("backup.db");
        snapshot(&db_path, &backup).await.unwrap();

        let copy = labeler_common::db::init_database(&backup).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM labels")
            .fetch_one(&copy)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
