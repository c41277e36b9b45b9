//! JSON-file backend for local runs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use telegpt_models::ConversationRecord;
use tracing::debug;

use crate::atomic::{read_json_if_exists, write_json_atomic};
use crate::backend::RecordBackend;
use crate::error::{PersistenceError, Result};

/// Stores the conversation record as a single pretty-printed JSON file.
/// File I/O runs on tokio's blocking pool.
///
/// ```text
/// {
///   "field": "messages",
///   "messages": [{"role": "user", "content": "..."}]
/// }
/// ```
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Creates a backend writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get_record(&self) -> Result<Option<ConversationRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_json_if_exists(&path))
            .await
            .map_err(|e| PersistenceError::Backend(format!("file read task failed: {}", e)))?
    }

    async fn put_record(&self, record: &ConversationRecord) -> Result<()> {
        let path = self.path.clone();
        let owned = record.clone();
        tokio::task::spawn_blocking(move || write_json_atomic(&path, &owned))
            .await
            .map_err(|e| PersistenceError::Backend(format!("file write task failed: {}", e)))??;
        debug!(path = %self.path.display(), turns = record.len(), "Conversation record written");
        Ok(())
    }
}
