//! Uploaded journal image storage.

use std::path::PathBuf;

use tokio::fs;
use tracing::{info, warn};

use reframe_core::ReframeError;

/// Extensions accepted for journal photos.
const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One uploaded file as received from the multipart request.
pub struct UploadedImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Writes uploaded journal photos into the images directory.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Store every valid image and return the saved filenames.
    ///
    /// Files with disallowed extensions or unusable names are skipped;
    /// zero stored files is an error.
    pub async fn save_images(
        &self,
        images: Vec<UploadedImage>,
    ) -> Result<Vec<String>, ReframeError> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to create images directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let mut saved = Vec::new();
        for image in images {
            if !has_allowed_extension(&image.filename) {
                warn!(filename = %image.filename, "Skipping non-image upload");
                continue;
            }
            let Some(name) = sanitize_filename(&image.filename) else {
                warn!(filename = %image.filename, "Skipping upload with unusable name");
                continue;
            };

            let path = self.dir.join(&name);
            fs::write(&path, &image.bytes).await.map_err(|e| {
                ReframeError::Storage(format!("failed to write image {}: {e}", path.display()))
            })?;
            saved.push(name);
        }

        if saved.is_empty() {
            return Err(ReframeError::Validation(
                "No valid images were uploaded".to_string(),
            ));
        }

        info!(count = saved.len(), dir = %self.dir.display(), "Stored uploaded images");
        Ok(saved)
    }
}

/// Whether the filename carries an accepted image extension.
pub fn has_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Reduce an uploaded filename to a safe basename.
///
/// Drops any directory components, keeps only `[A-Za-z0-9._-]`, and strips
/// leading dots so the result can never escape the images directory.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stores_valid_images_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("journal_images"));

        let saved = store
            .save_images(vec![
                UploadedImage {
                    filename: "page one.jpg".into(),
                    bytes: vec![0xFF, 0xD8],
                },
                UploadedImage {
                    filename: "notes.txt".into(),
                    bytes: b"not an image".to_vec(),
                },
            ])
            .await
            .unwrap();

        assert_eq!(saved, vec!["page_one.jpg".to_string()]);
        assert!(dir.path().join("journal_images/page_one.jpg").exists());
        assert!(!dir.path().join("journal_images/notes.txt").exists());
    }

    #[tokio::test]
    async fn all_invalid_uploads_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("journal_images"));

        let err = store
            .save_images(vec![UploadedImage {
                filename: "journal.pdf".into(),
                bytes: vec![],
            }])
            .await
            .unwrap_err();
        assert!(matches!(err, ReframeError::Validation(_)));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_allowed_extension("scan.JPG"));
        assert!(has_allowed_extension("scan.jpeg"));
        assert!(!has_allowed_extension("scan.gif"));
        assert!(!has_allowed_extension("no-extension"));
    }

    #[test]
    fn sanitize_strips_directories_and_odd_chars() {
        assert_eq!(
            sanitize_filename("../../etc/passwd.png"),
            Some("passwd.png".to_string())
        );
        assert_eq!(
            sanitize_filename("C:\\photos\\day one.jpg"),
            Some("day_one.jpg".to_string())
        );
        assert_eq!(sanitize_filename("..."), None);
    }
}
