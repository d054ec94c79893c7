//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the root folder
pub const ROOT_ENV_VAR: &str = "VIREO_ROOT";

/// Resolve the root data folder, in priority order:
/// 1. Command-line argument (highest priority)
/// 2. `VIREO_ROOT` environment variable
/// 3. `root_folder` key in the TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    if let Ok(path) = std::env::var(ROOT_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    Ok(default_root_folder())
}

/// Path of the durable entity store under the root folder
pub fn database_path(root: &Path) -> PathBuf {
    root.join("vireo.db")
}

/// Path of the legacy bootstrap mirror under the root folder
pub fn bootstrap_path(root: &Path) -> PathBuf {
    root.join("bootstrap.toml")
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/vireo/config.toml first, then /etc/vireo/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("vireo").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/vireo/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("vireo").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("vireo"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/vireo"))
    } else {
        dirs::data_local_dir()
            .map(|d| d.join("vireo"))
            .unwrap_or_else(|| PathBuf::from("./vireo_data"))
    }
}
