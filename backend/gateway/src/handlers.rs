//! HTTP handlers for the journaling API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use reframe_core::{AnalysisResult, ReframeError};
use reframe_storage::UploadedImage;

use crate::error::ApiError;
use crate::server::AppState;

// ---------------------------------------------------------------------------
// /analyse
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AnalyseRequest {
    pub question: String,
    #[serde(default)]
    pub use_context: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyseResponse {
    pub result: AnalysisResult,
    pub source_content: Option<String>,
    pub success: bool,
    pub message: Option<String>,
}

/// Handler for `POST /analyse`: classify a question against the catalog.
pub async fn analyse(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyseRequest>, JsonRejection>,
) -> Result<Json<AnalyseResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_request)?;

    info!(
        use_context = request.use_context,
        question_len = request.question.len(),
        "Processing analysis request"
    );

    let outcome = state
        .analysis
        .analyse(&request.question, request.use_context)
        .await?;

    Ok(Json(AnalyseResponse {
        result: outcome.result,
        source_content: outcome.source_content,
        success: true,
        message: None,
    }))
}

// ---------------------------------------------------------------------------
// /cognitive-distortions
// ---------------------------------------------------------------------------

/// Handler for `GET /cognitive-distortions`: the static catalog as JSON.
pub async fn cognitive_distortions(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.catalog.to_json())
}

// ---------------------------------------------------------------------------
// /save-entry
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveEntryRequest {
    #[serde(rename = "situationThoughts", default)]
    pub situation_thoughts: String,
    #[serde(rename = "cognitiveDistortions", default)]
    pub cognitive_distortions: Vec<String>,
    #[serde(rename = "challengeAnswers", default)]
    pub challenge_answers: HashMap<String, Vec<String>>,
}

/// Handler for `POST /save-entry`: persist one journal entry.
pub async fn save_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveEntryRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(invalid_request)?;

    if request.situation_thoughts.trim().is_empty() {
        return Err(ApiError(ReframeError::Validation(
            "situationThoughts cannot be empty".to_string(),
        )));
    }

    let entry_count = state
        .entry_store
        .save(
            &request.situation_thoughts,
            request.cognitive_distortions,
            request.challenge_answers,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Entry saved successfully",
        "entry_count": entry_count,
    })))
}

// ---------------------------------------------------------------------------
// /upload-images
// ---------------------------------------------------------------------------

/// Handler for `POST /upload-images`: store multipart journal photos.
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError(ReframeError::Validation(format!("Invalid multipart request: {e}")))
    })? {
        if field.name() != Some("images") {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if filename.is_empty() {
            continue;
        }
        let bytes = field.bytes().await.map_err(|e| {
            ApiError(ReframeError::Validation(format!("Failed to read upload: {e}")))
        })?;
        images.push(UploadedImage {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    if images.is_empty() {
        return Err(ApiError(ReframeError::Validation("No images provided".to_string())));
    }

    let files = state.image_store.save_images(images).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Successfully uploaded {} images", files.len()),
        "files": files,
    })))
}

// ---------------------------------------------------------------------------
// /process-images
// ---------------------------------------------------------------------------

/// Handler for `POST /process-images`: OCR the stored journal photos.
pub async fn process_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let extracted_text = state.ocr.process_directory(state.image_store.dir()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Successfully processed images",
        "text_length": extracted_text.chars().count(),
        "extracted_text": extracted_text,
    })))
}

// ---------------------------------------------------------------------------
// /save-text
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SaveTextRequest {
    #[serde(default)]
    pub text: String,
}

/// Handler for `POST /save-text`: persist the extracted journal text.
pub async fn save_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveTextRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload.map_err(invalid_request)?;

    let text_length = state.text_store.save(&request.text).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Text saved successfully",
        "text_length": text_length,
    })))
}

// ---------------------------------------------------------------------------
// /health
// ---------------------------------------------------------------------------

/// Liveness endpoint.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "reframe",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fallback for unknown routes, keeping the JSON error contract.
pub async fn not_found() -> ApiError {
    ApiError(ReframeError::NotFound("Endpoint not found".to_string()))
}

fn invalid_request(rejection: JsonRejection) -> ApiError {
    ApiError(ReframeError::Validation(format!(
        "Invalid request format: {rejection}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_context_defaults_to_false() {
        let request: AnalyseRequest =
            serde_json::from_str(r#"{"question": "why do I spiral?"}"#).unwrap();
        assert!(!request.use_context);
    }

    #[test]
    fn save_entry_accepts_camel_case_payload() {
        let request: SaveEntryRequest = serde_json::from_str(
            r#"{
                "situationThoughts": "I froze in the meeting",
                "cognitiveDistortions": ["Mind Reading"],
                "challengeAnswers": {"Mind Reading": ["They may not have noticed"]}
            }"#,
        )
        .unwrap();
        assert_eq!(request.situation_thoughts, "I froze in the meeting");
        assert_eq!(request.cognitive_distortions, vec!["Mind Reading".to_string()]);
        assert_eq!(request.challenge_answers["Mind Reading"].len(), 1);
    }

    #[test]
    fn save_entry_fields_default_when_missing() {
        let request: SaveEntryRequest =
            serde_json::from_str(r#"{"situationThoughts": "just this"}"#).unwrap();
        assert!(request.cognitive_distortions.is_empty());
        assert!(request.challenge_answers.is_empty());
    }
}
