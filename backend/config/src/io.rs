//! Config file location and loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};

use crate::schema::ReframeConfig;

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the Reframe config directory.
/// Priority: `REFRAME_CONFIG_DIR` env > `~/.reframe/` > `./.reframe`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REFRAME_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".reframe");
    }
    PathBuf::from(".reframe")
}

/// Full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns defaults if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<ReframeConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ReframeConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ReframeConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.yaml")).await.unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[tokio::test]
    async fn loads_yaml_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "server:\n  port: 7777\n").await.unwrap();
        let config = load_config(&path).await.unwrap();
        assert_eq!(config.server.port, 7777);
    }

    #[tokio::test]
    async fn invalid_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "server: [not-a-map\n").await.unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
