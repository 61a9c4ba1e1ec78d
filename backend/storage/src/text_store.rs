//! Persistence for the raw full-journal text (OCR output).

use std::path::PathBuf;

use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use reframe_core::ReframeError;

/// Stores the running full-journal text file. Each save replaces the file,
/// matching the frontend's "save extracted text" flow.
pub struct TextStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TextStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Persist `text` and return its character length.
    pub async fn save(&self, text: &str) -> Result<usize, ReframeError> {
        if text.trim().is_empty() {
            return Err(ReframeError::Validation(
                "Text content cannot be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ReframeError::Storage(format!(
                    "failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        fs::write(&self.path, text.as_bytes()).await.map_err(|e| {
            ReframeError::Storage(format!("failed to write text {}: {e}", self.path.display()))
        })?;

        let length = text.chars().count();
        info!(path = %self.path.display(), length, "Saved journal text");
        Ok(length)
    }
}
