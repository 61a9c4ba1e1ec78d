//! The static cognitive-distortion reference catalog.
//!
//! Loaded once at startup, from the embedded definitions or a configured
//! override file, and shared read-only for the life of the process.

use std::path::Path;

use tracing::info;

use reframe_core::{DistortionDefinition, ReframeError};

/// Definitions bundled with the binary.
const EMBEDDED_CATALOG: &str = include_str!("../data/cognitive_distortions.json");

/// Immutable catalog of recognized cognitive distortions.
#[derive(Debug)]
pub struct DistortionCatalog {
    distortions: Vec<DistortionDefinition>,
}

impl DistortionCatalog {
    /// Build the catalog from the embedded definitions.
    pub fn embedded() -> Result<Self, ReframeError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load from an override file when configured, else the embedded set.
    pub async fn load(path: Option<&Path>) -> Result<Self, ReframeError> {
        match path {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                    ReframeError::Catalog(format!(
                        "failed to read catalog file {}: {e}",
                        path.display()
                    ))
                })?;
                let catalog = Self::from_json(&raw)?;
                info!(path = %path.display(), count = catalog.distortions.len(), "Loaded distortion catalog");
                Ok(catalog)
            }
            None => Self::embedded(),
        }
    }

    fn from_json(raw: &str) -> Result<Self, ReframeError> {
        let distortions: Vec<DistortionDefinition> = serde_json::from_str(raw)
            .map_err(|e| ReframeError::Catalog(format!("invalid catalog JSON: {e}")))?;

        if distortions.is_empty() {
            return Err(ReframeError::Catalog("catalog has no definitions".to_string()));
        }
        for definition in &distortions {
            if definition.name.trim().is_empty() {
                return Err(ReframeError::Catalog("catalog entry with empty name".to_string()));
            }
        }
        let mut seen: Vec<String> = Vec::new();
        for definition in &distortions {
            let lowered = definition.name.to_lowercase();
            if seen.contains(&lowered) {
                return Err(ReframeError::Catalog(format!(
                    "duplicate catalog name: {}",
                    definition.name
                )));
            }
            seen.push(lowered);
        }

        Ok(Self { distortions })
    }

    /// All definitions in catalog order.
    pub fn definitions(&self) -> &[DistortionDefinition] {
        &self.distortions
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&DistortionDefinition> {
        let needle = name.trim().to_lowercase();
        self.distortions
            .iter()
            .find(|d| d.name.to_lowercase() == needle)
    }

    /// Catalog names in catalog order, for closed-vocabulary prompting.
    pub fn names(&self) -> Vec<&str> {
        self.distortions.iter().map(|d| d.name.as_str()).collect()
    }

    /// Serialize the catalog for the public endpoint.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.distortions)
    }
}
