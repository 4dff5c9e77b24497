//! Configuration loading and root folder resolution
//!
//! The root folder holds the label database (`labels.db`) and its
//! `backups/` directory.

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable consulted when no command-line root folder is given
pub const ROOT_FOLDER_ENV: &str = "LABELER_ROOT_FOLDER";

/// File name of the label database inside the root folder
pub const DATABASE_FILE: &str = "labels.db";

/// Directory (inside the root folder) receiving database backups
pub const BACKUP_DIR: &str = "backups";

/// Root folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`root_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = config_file_path() {
        match read_root_folder(&config_path) {
            Ok(Some(root)) => return root,
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring config file {}: {}", config_path.display(), e),
        }
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Read the `root_folder` key from a TOML config file
pub fn read_root_folder(config_path: &Path) -> Result<Option<PathBuf>> {
    let content = std::fs::read_to_string(config_path)?;
    let config = toml::from_str::<toml::Value>(&content)
        .map_err(|e| Error::Config(format!("{}: {}", config_path.display(), e)))?;

    Ok(config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from))
}

/// Location of the database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Get configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("labeler").join("config.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Ok(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/labeler/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config("No config file found".to_string()))
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("labeler"))
        .unwrap_or_else(|| PathBuf::from("./labeler_data"))
}
