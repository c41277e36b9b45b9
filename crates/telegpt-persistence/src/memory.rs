//! In-process backend.

use async_trait::async_trait;
use telegpt_models::ConversationRecord;
use tokio::sync::RwLock;

use crate::backend::RecordBackend;
use crate::error::Result;

/// Keeps the record in memory; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    record: RwLock<Option<ConversationRecord>>,
}

impl MemoryBackend {
    /// Creates a backend with no record (reads fail until provisioned).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend already holding `record`.
    pub fn with_record(record: ConversationRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_record(&self) -> Result<Option<ConversationRecord>> {
        Ok(self.record.read().await.clone())
    }

    async fn put_record(&self, record: &ConversationRecord) -> Result<()> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }
}
