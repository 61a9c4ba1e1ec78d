//! `reframe-config` — Reframe runtime configuration.
//!
//! Provides:
//! - Typed config schema (server, model endpoint, storage paths, logging)
//! - YAML read with defaults for missing file/fields
//! - `${ENV_VAR}` substitution
//! - `REFRAME_*` / `OLLAMA_*` env overrides

pub mod env;
pub mod io;
pub mod schema;

pub use env::{MissingEnvVarError, apply_env_overrides, resolve_env_vars};
pub use io::{config_dir, config_file_path, load_config};
pub use schema::{LoggingConfig, ModelConfig, ReframeConfig, ServerConfig, StorageConfig};

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Load, substitute env vars, and apply overrides to a config file.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(path: &Path) -> Result<ReframeConfig> {
    let raw_config = load_config(path).await?;

    // Run the ${VAR} substitution pass over the serialized tree.
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: ReframeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    Ok(apply_env_overrides(config))
}
