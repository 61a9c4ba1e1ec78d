use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the static cognitive-distortion reference catalog.
///
/// Loaded once at startup and shared read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistortionDefinition {
    /// Unique catalog name (e.g., "Catastrophising").
    pub name: String,
    /// Plain-language description of the thinking pattern.
    pub description: String,
    /// Challenge questions for this distortion; may be empty.
    #[serde(default)]
    pub questions: Vec<String>,
}

/// A distortion the model identified in the user's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifiedDistortion {
    pub name: String,
    /// How the distortion shows up in this particular text.
    pub explanation: String,
    /// Challenge questions; filled from the catalog for issue items.
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Structured outcome of one analysis request.
///
/// `cognitive_distortions_context` and `comparison` are only present in
/// context mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub cognitive_distortions_issue: Vec<IdentifiedDistortion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_distortions_context: Option<Vec<IdentifiedDistortion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
}

/// A persisted user submission. Append-only; never mutated once written.
///
/// Wire field names keep the frontend's camelCase contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(rename = "situationThoughts")]
    pub situation_thoughts: String,
    /// Distortion names the user selected; not validated against the catalog.
    #[serde(rename = "cognitiveDistortions", default)]
    pub cognitive_distortions: Vec<String>,
    /// Free-text answers keyed by distortion name.
    #[serde(rename = "challengeAnswers", default)]
    pub challenge_answers: HashMap<String, Vec<String>>,
    /// Server-assigned at write time.
    pub timestamp: DateTime<Utc>,
}
