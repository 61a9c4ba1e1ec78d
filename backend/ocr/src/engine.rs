//! OCR over journal images through an Ollama vision model.
//!
//! Each image is sent as an inline base64 payload to `/api/generate`.
//! Single-image failures do not abort the batch; the failure is embedded
//! in the combined text instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use reframe_core::ReframeError;

const OCR_PROMPT: &str = "Perform Optical Character Recognition (OCR) on the following image. \
The output should be the extracted text";

/// Handwriting makes small vision models ramble; keep output bounded.
const NUM_PREDICT: u32 = 300;
const REPEAT_PENALTY: f32 = 2.0;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Vision-model OCR client.
pub struct OcrEngine {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OcrEngine {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build OCR HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    /// OCR every image in `dir` and return the combined, labelled text.
    ///
    /// A missing directory or an empty one is a not-found error; a failed
    /// individual image becomes a bracketed note in the output.
    pub async fn process_directory(&self, dir: &Path) -> Result<String, ReframeError> {
        let image_files = list_image_files(dir).await?;
        info!(count = image_files.len(), dir = %dir.display(), "Processing journal images");

        let mut full_text = String::new();
        for path in &image_files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let section = match self.extract_text(path).await {
                Ok(text) if !text.trim().is_empty() => section_for(&name, &text),
                Ok(_) => section_for(&name, "[No text extracted]"),
                Err(e) => {
                    warn!(image = %name, error = %e, "OCR failed for image");
                    section_for(&name, &format!("[OCR processing failed: {e}]"))
                }
            };
            // The frontend renders this as one running paragraph.
            full_text.push_str(&flatten_newlines(&section));
        }

        info!(count = image_files.len(), "Finished processing journal images");
        Ok(full_text)
    }

    /// Extract text from a single image file.
    async fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image {}", path.display()))?;
        let encoded = STANDARD.encode(&bytes);

        let body = serde_json::json!({
            "model": self.model,
            "prompt": OCR_PROMPT,
            "images": [encoded],
            "stream": false,
            "options": {
                "num_predict": NUM_PREDICT,
                "repeat_penalty": REPEAT_PENALTY,
            }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .context("Ollama vision request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama vision returned {}: {}", status, error_body);
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Ollama vision response")?;

        Ok(generated.response.trim().to_string())
    }
}

/// All image files in `dir`, sorted by name for stable output order.
async fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, ReframeError> {
    if !dir.exists() {
        return Err(ReframeError::NotFound(format!(
            "images directory not found: {}",
            dir.display()
        )));
    }

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        ReframeError::Storage(format!("failed to list images in {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| {
        ReframeError::Storage(format!("failed to list images in {}: {e}", dir.display()))
    })? {
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(ReframeError::NotFound(format!(
            "no image files found in directory: {}",
            dir.display()
        )));
    }

    files.sort();
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn section_for(name: &str, text: &str) -> String {
    format!("\n\n--- {name} ---\n{text}")
}

fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_image_files(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ReframeError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_image_files(dir.path()).await.unwrap_err();
        assert!(matches!(err, ReframeError::NotFound(_)));
    }

    #[tokio::test]
    async fn lists_only_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.PNG", "notes.txt", "c.jpeg"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let files = list_image_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.jpg", "c.jpeg"]);
    }

    #[test]
    fn sections_are_labelled_and_flattened() {
        let section = section_for("page1.jpg", "line one\nline two");
        let flat = flatten_newlines(&section);
        assert!(flat.contains("--- page1.jpg ---"));
        assert!(!flat.contains('\n'));
        assert!(flat.contains("line one line two"));
    }
}
