//! Append-only journal entry records plus the retrieval corpus.
//!
//! One save = two side effects under one lock: the entry is appended to
//! the JSON record file, and its situation text is appended to the corpus
//! file. Both must complete before success is reported.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use reframe_core::{JournalEntry, ReframeError};

/// Separator between corpus chunks.
const CORPUS_CHUNK_SEPARATOR: &str = "\n\n";

/// Flat-file store for journal entries and the retrieval corpus.
pub struct EntryStore {
    entries_path: PathBuf,
    corpus_path: PathBuf,
    /// Guards the read-modify-append section across both files.
    write_lock: Mutex<()>,
}

impl EntryStore {
    pub fn new(entries_path: PathBuf, corpus_path: PathBuf) -> Self {
        Self {
            entries_path,
            corpus_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Persist a new entry and return the updated total entry count.
    ///
    /// The timestamp is assigned here, at write time. Holds the store lock
    /// for the whole record-append + corpus-append sequence so concurrent
    /// saves cannot interleave.
    pub async fn save(
        &self,
        situation_thoughts: &str,
        cognitive_distortions: Vec<String>,
        challenge_answers: HashMap<String, Vec<String>>,
    ) -> Result<usize, ReframeError> {
        let entry = JournalEntry {
            situation_thoughts: situation_thoughts.to_string(),
            cognitive_distortions,
            challenge_answers,
            timestamp: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_entries_unlocked().await?;
        entries.push(entry);
        self.write_entries_unlocked(&entries).await?;
        self.append_corpus_unlocked(situation_thoughts).await?;

        info!(count = entries.len(), "Saved journal entry");
        Ok(entries.len())
    }

    /// All persisted entries, oldest first.
    pub async fn entries(&self) -> Result<Vec<JournalEntry>, ReframeError> {
        let _guard = self.write_lock.lock().await;
        self.read_entries_unlocked().await
    }

    /// The full corpus text, verbatim. Empty string before the first save.
    pub async fn read_corpus(&self) -> Result<String, ReframeError> {
        let _guard = self.write_lock.lock().await;
        if !self.corpus_path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&self.corpus_path).await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to read corpus {}: {e}",
                self.corpus_path.display()
            ))
        })
    }

    async fn read_entries_unlocked(&self) -> Result<Vec<JournalEntry>, ReframeError> {
        if !self.entries_path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.entries_path).await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to read entries {}: {e}",
                self.entries_path.display()
            ))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReframeError::Storage(format!(
                "entries file {} is corrupt: {e}",
                self.entries_path.display()
            ))
        })
    }

    /// Write the full record set to a temp file, then rename into place.
    async fn write_entries_unlocked(&self, entries: &[JournalEntry]) -> Result<(), ReframeError> {
        if let Some(parent) = self.entries_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ReframeError::Storage(format!(
                    "failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| ReframeError::Storage(format!("failed to serialize entries: {e}")))?;

        let tmp_path = self.entries_path.with_extension("json.tmp");
        fs::write(&tmp_path, json.as_bytes()).await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to write temp entries {}: {e}",
                tmp_path.display()
            ))
        })?;
        fs::rename(&tmp_path, &self.entries_path).await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to move entries into place {}: {e}",
                self.entries_path.display()
            ))
        })?;

        debug!(path = %self.entries_path.display(), count = entries.len(), "Wrote entry records");
        Ok(())
    }

    async fn append_corpus_unlocked(&self, chunk: &str) -> Result<(), ReframeError> {
        if let Some(parent) = self.corpus_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                ReframeError::Storage(format!(
                    "failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.corpus_path)
            .await
            .map_err(|e| {
                ReframeError::Storage(format!(
                    "failed to open corpus {}: {e}",
                    self.corpus_path.display()
                ))
            })?;

        let append = async {
            file.write_all(chunk.as_bytes()).await?;
            file.write_all(CORPUS_CHUNK_SEPARATOR.as_bytes()).await
        };
        append.await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to append to corpus {}: {e}",
                self.corpus_path.display()
            ))
        })?;
        file.flush().await.map_err(|e| {
            ReframeError::Storage(format!(
                "failed to flush corpus {}: {e}",
                self.corpus_path.display()
            ))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store_in(dir: &std::path::Path) -> EntryStore {
        EntryStore::new(dir.join("entries.json"), dir.join("corpus.txt"))
    }

    #[tokio::test]
    async fn save_increments_count_and_appends_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let count = store
            .save("I always mess things up", vec!["Overgeneralisation".into()], HashMap::new())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let count = store.save("Nobody replied to my email", vec![], HashMap::new())
            .await
            .unwrap();
        assert_eq!(count, 2);

        let corpus = store.read_corpus().await.unwrap();
        assert!(corpus.contains("I always mess things up"));
        assert!(corpus.contains("Nobody replied to my email"));
    }

    #[tokio::test]
    async fn corpus_is_empty_before_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert_eq!(store.read_corpus().await.unwrap(), "");
    }

    #[tokio::test]
    async fn entries_round_trip_with_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut answers = HashMap::new();
        answers.insert("Mind Reading".to_string(), vec!["They may just be busy".to_string()]);
        store.save("My friend hates me", vec!["Mind Reading".into()], answers)
            .await
            .unwrap();

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].situation_thoughts, "My friend hates me");
        assert_eq!(entries[0].cognitive_distortions, vec!["Mind Reading".to_string()]);
        assert!(entries[0].timestamp <= Utc::now());
    }

    #[tokio::test]
    async fn concurrent_saves_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(dir.path()));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.save(&format!("situation {i}"), vec![], HashMap::new()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = store.entries().await.unwrap();
        assert_eq!(entries.len(), 10);

        let corpus = store.read_corpus().await.unwrap();
        for i in 0..10 {
            assert!(corpus.contains(&format!("situation {i}")));
        }
    }

    #[tokio::test]
    async fn corrupt_entries_file_surfaces_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("entries.json"), "{not json")
            .await
            .unwrap();
        let store = store_in(dir.path());
        let err = store.save("x", vec![], HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ReframeError::Storage(_)));
    }
}
