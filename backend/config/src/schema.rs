//! Typed configuration schema for the Reframe backend.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReframeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub debug: bool,

    /// Allowed CORS origins; `["*"]` means any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

/// Ollama endpoint and model selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model used for distortion analysis.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Vision model used for OCR over journal images.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    /// Outbound request timeout; a blocked model call fails after this.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Flat-file storage locations, all resolved under `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Optional override for the distortion catalog JSON; the embedded
    /// catalog is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join("journal_entries.json")
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.data_dir.join("journal_corpus.txt")
    }

    pub fn full_text_path(&self) -> PathBuf {
        self.data_dir.join("full_journal_text.txt")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("journal_images")
    }
}

/// Log output settings; `RUST_LOG` still wins for level filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            cors_origins: default_cors_origins(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            vision_model: default_vision_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: default_log_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "gemma3:4b".to_string()
}

fn default_vision_model() -> String {
    "qwen2.5vl:7b".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.3
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config: ReframeConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.base_url, "http://localhost:11434");
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn storage_paths_resolve_under_data_dir() {
        let storage = StorageConfig {
            data_dir: PathBuf::from("/var/lib/reframe"),
            catalog_path: None,
        };
        assert_eq!(
            storage.corpus_path(),
            PathBuf::from("/var/lib/reframe/journal_corpus.txt")
        );
        assert_eq!(
            storage.images_dir(),
            PathBuf::from("/var/lib/reframe/journal_images")
        );
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "server:\n  port: 8123\nmodel:\n  chatModel: llama3.2\n";
        let config: ReframeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.chat_model, "llama3.2");
        assert_eq!(config.model.vision_model, "qwen2.5vl:7b");
    }
}
