//! The conversation store: read-all, append and clear over one record.

use std::sync::Arc;

use telegpt_models::{ConversationRecord, Turn, RECORD_KEY_VALUE};
use tracing::{debug, info};

use crate::backend::RecordBackend;
use crate::error::{PersistenceError, Result};

/// Wraps the single remote record holding the ordered list of prior turns.
///
/// Every operation performs a full read and/or a full write of the record.
/// `append` is a read-modify-write with no locking here: two concurrent
/// appends can lose one of the turns. Callers serialize turns themselves
/// (the bot's command router holds a lock per message).
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn RecordBackend>,
}

impl ConversationStore {
    /// Creates a store over the given backend.
    pub fn new(backend: impl RecordBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Creates a store over a shared backend.
    pub fn from_shared(backend: Arc<dyn RecordBackend>) -> Self {
        Self { backend }
    }

    /// Name of the backend in use.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    async fn load(&self) -> Result<ConversationRecord> {
        self.backend
            .get_record()
            .await?
            .ok_or_else(|| PersistenceError::RecordMissing {
                key: RECORD_KEY_VALUE.to_string(),
            })
    }

    /// Returns every stored turn, oldest first.
    ///
    /// Fails with [`PersistenceError::RecordMissing`] if the record was never
    /// provisioned.
    pub async fn read_all(&self) -> Result<Vec<Turn>> {
        let record = self.load().await?;
        debug!(backend = self.backend.name(), turns = record.len(), "Conversation loaded");
        Ok(record.messages)
    }

    /// Pushes `turn` to the end of the history.
    pub async fn append(&self, turn: Turn) -> Result<()> {
        let mut record = self.load().await?;
        let role = turn.role;
        record.messages.push(turn);
        self.backend.put_record(&record).await?;
        debug!(backend = self.backend.name(), role = %role, turns = record.len(), "Turn appended");
        Ok(())
    }

    /// Replaces the history with an empty sequence.
    pub async fn clear(&self) -> Result<()> {
        let mut record = self.load().await?;
        let dropped = record.len();
        record.messages.clear();
        self.backend.put_record(&record).await?;
        info!(backend = self.backend.name(), dropped, "Conversation cleared");
        Ok(())
    }

    /// Creates the empty record if it does not exist yet.
    ///
    /// Returns `true` when a record was created.
    pub async fn provision(&self) -> Result<bool> {
        if self.backend.get_record().await?.is_some() {
            return Ok(false);
        }
        self.backend.put_record(&ConversationRecord::empty()).await?;
        info!(backend = self.backend.name(), "Conversation record provisioned");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_backend::JsonFileBackend;
    use crate::memory::MemoryBackend;
    use tempfile::tempdir;

    fn provisioned_store() -> ConversationStore {
        ConversationStore::new(MemoryBackend::with_record(ConversationRecord::empty()))
    }

    #[tokio::test]
    async fn test_read_all_missing_record() {
        let store = ConversationStore::new(MemoryBackend::new());

        let result = store.read_all().await;
        assert!(matches!(result, Err(PersistenceError::RecordMissing { .. })));
    }

    #[tokio::test]
    async fn test_append_missing_record_writes_nothing() {
        let backend = Arc::new(MemoryBackend::new());
        let store = ConversationStore::from_shared(backend.clone());

        assert!(store.append(Turn::user("lost")).await.is_err());
        assert!(backend.get_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let store = provisioned_store();
        store.append(Turn::user("earlier")).await.unwrap();

        let t1 = Turn::user("What is Rust?");
        let t2 = Turn::assistant("A systems language.");
        store.append(t1.clone()).await.unwrap();
        store.append(t2.clone()).await.unwrap();

        let turns = store.read_all().await.unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(&turns[1..], &[t1, t2]);
    }

    #[tokio::test]
    async fn test_read_all_is_idempotent() {
        let store = provisioned_store();
        store.append(Turn::user("a")).await.unwrap();

        let first = store.read_all().await.unwrap();
        let second = store.read_all().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clear_empties_history() {
        let store = provisioned_store();
        store.append(Turn::user("a")).await.unwrap();
        store.append(Turn::assistant("b")).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provision_only_once() {
        let store = ConversationStore::new(MemoryBackend::new());

        assert!(store.provision().await.unwrap());
        store.append(Turn::user("kept")).await.unwrap();
        assert!(!store.provision().await.unwrap());

        assert_eq!(store.read_all().await.unwrap(), vec![Turn::user("kept")]);
    }

    #[tokio::test]
    async fn test_file_backed_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversation.json");

        let store = ConversationStore::new(JsonFileBackend::new(&path));
        store.provision().await.unwrap();
        store.append(Turn::user("hello")).await.unwrap();
        store.append(Turn::assistant("hi there")).await.unwrap();

        let reopened = ConversationStore::new(JsonFileBackend::new(&path));
        assert_eq!(reopened.backend_name(), "file");
        assert_eq!(
            reopened.read_all().await.unwrap(),
            vec![Turn::user("hello"), Turn::assistant("hi there")]
        );
    }
}
