//! Environment handling for config values.
//!
//! Two mechanisms, applied in order at load time:
//! 1. `${VAR_NAME}` substitution inside string values (uppercase names only).
//! 2. `REFRAME_*` / `OLLAMA_*` override variables for the common knobs.

use std::collections::HashMap;

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::schema::ReframeConfig;

static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars referenced from config.
#[derive(Debug, thiserror::Error)]
#[error("missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Walks the tree recursively; only string leaves are processed. Referencing
/// an unset or empty variable is an error naming the variable and path.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute using a provided map (used by tests).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut error: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        if error.is_some() {
            return String::new();
        }
        let var_name = &caps[1];
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                error = Some(MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = error {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Apply well-known override variables on top of a loaded config.
pub fn apply_env_overrides(mut config: ReframeConfig) -> ReframeConfig {
    apply_overrides_with(&mut config, &std::env::vars().collect());
    config
}

fn apply_overrides_with(config: &mut ReframeConfig, env: &HashMap<String, String>) {
    if let Some(host) = env.get("REFRAME_HOST") {
        config.server.host = host.clone();
    }
    if let Some(port) = env.get("REFRAME_PORT").and_then(|p| p.parse().ok()) {
        config.server.port = port;
    }
    if let Some(debug) = env.get("REFRAME_DEBUG") {
        config.server.debug = debug.eq_ignore_ascii_case("true") || debug == "1";
    }
    if let Some(origins) = env.get("REFRAME_CORS_ORIGINS") {
        config.server.cors_origins = origins
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
    }
    if let Some(dir) = env.get("REFRAME_DATA_DIR") {
        config.storage.data_dir = dir.into();
    }
    if let Some(url) = env.get("OLLAMA_BASE_URL") {
        config.model.base_url = url.clone();
    }
    if let Some(model) = env.get("OLLAMA_MODEL") {
        config.model.chat_model = model.clone();
    }
    if let Some(model) = env.get("OCR_LLM_MODEL") {
        config.model.vision_model = model.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"baseUrl": "${OLLAMA_HOST_URL}"});
        let env = env(&[("OLLAMA_HOST_URL", "http://10.0.0.2:11434")]);
        let result = resolve_env_vars_with(&v, &env).unwrap();
        assert_eq!(result["baseUrl"], "http://10.0.0.2:11434");
    }

    #[test]
    fn error_on_missing_var_names_it() {
        let v = json!({"model": {"chatModel": "${MISSING_MODEL}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("MISSING_MODEL"));
        assert!(msg.contains("model.chatModel"));
    }

    #[test]
    fn passthrough_non_var_strings() {
        let v = json!({"host": "0.0.0.0"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["host"], "0.0.0.0");
    }

    #[test]
    fn overrides_server_and_model_fields() {
        let mut config = ReframeConfig::default();
        let env = env(&[
            ("REFRAME_PORT", "9000"),
            ("REFRAME_CORS_ORIGINS", "http://localhost:3000, http://app.local"),
            ("OLLAMA_MODEL", "llama3.2"),
        ]);
        apply_overrides_with(&mut config, &env);
        assert_eq!(config.server.port, 9000);
        assert_eq!(
            config.server.cors_origins,
            vec!["http://localhost:3000".to_string(), "http://app.local".to_string()]
        );
        assert_eq!(config.model.chat_model, "llama3.2");
    }

    #[test]
    fn unparseable_port_override_is_ignored() {
        let mut config = ReframeConfig::default();
        apply_overrides_with(&mut config, &env(&[("REFRAME_PORT", "not-a-port")]));
        assert_eq!(config.server.port, 5000);
    }
}
