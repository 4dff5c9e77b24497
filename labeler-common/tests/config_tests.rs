//! Tests for root folder resolution and config file parsing

use labeler_common::config::{database_path, read_root_folder, resolve_root_folder};
use std::path::{Path, PathBuf};

#[test]
fn test_cli_argument_wins() {
    let resolved = resolve_root_folder(
        Some(Path::new("/srv/labels")),
        "LABELER_TEST_UNUSED_ENV_CLI",
    );
    assert_eq!(resolved, PathBuf::from("/srv/labels"));
}

#[test]
fn test_env_var_used_without_cli_argument() {
    let var = "LABELER_TEST_ROOT_FROM_ENV";
    std::env::set_var(var, "/tmp/labeler-env-root");
    let resolved = resolve_root_folder(None, var);
    std::env::remove_var(var);
    assert_eq!(resolved, PathBuf::from("/tmp/labeler-env-root"));
}

#[test]
fn test_fallback_is_not_empty() {
    let resolved = resolve_root_folder(None, "LABELER_TEST_NEVER_SET");
    assert!(!resolved.as_os_str().is_empty());
}

#[test]
fn test_read_root_folder_from_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "root_folder = \"/data/labels\"\nport = 5001\n").unwrap();

    let root = read_root_folder(&config).unwrap();
    assert_eq!(root, Some(PathBuf::from("/data/labels")));
}

#[test]
fn test_read_root_folder_missing_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "port = 5001\n").unwrap();

    assert_eq!(read_root_folder(&config).unwrap(), None);
}

#[test]
fn test_read_root_folder_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "root_folder = [unclosed").unwrap();

    let err = read_root_folder(&config).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));
}

#[test]
fn test_database_path_inside_root() {
    assert_eq!(
        database_path(Path::new("/srv/labels")),
        PathBuf::from("/srv/labels/labels.db")
    );
}
