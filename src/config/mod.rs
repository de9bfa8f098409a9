//! Configuration module for the search gateway
//!
//! Handles loading settings from YAML files and environment variables.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Load settings from an explicit path, the usual locations, or defaults.
///
/// Environment overrides are applied on top in every case.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        return load_file(path);
    }

    if let Ok(path) = std::env::var("GATEWAY_SETTINGS_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return load_file(&path);
        }
    }

    for path in default_paths() {
        if path.exists() {
            return load_file(&path);
        }
    }

    info!("No settings file found, using defaults");
    let mut settings = Settings::default();
    settings.merge_env();
    Ok(settings)
}

fn load_file(path: &Path) -> Result<Settings> {
    info!("Loading settings from: {}", path.display());
    let mut settings = Settings::from_file(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    settings.merge_env();
    Ok(settings)
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("settings.yml"),
        PathBuf::from("config/settings.yml"),
        PathBuf::from("/etc/search-gateway/settings.yml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("search-gateway/settings.yml"));
    }
    paths
}
