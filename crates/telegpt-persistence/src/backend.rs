//! Storage backend abstraction for the conversation record.

use async_trait::async_trait;
use telegpt_models::ConversationRecord;

use crate::error::Result;

/// A place the single conversation record can be fetched from and written to.
///
/// Backends only move whole records; read-modify-write logic lives in
/// [`ConversationStore`](crate::ConversationStore).
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Fetches the record, or `None` if it was never provisioned.
    async fn get_record(&self) -> Result<Option<ConversationRecord>>;

    /// Overwrites the record.
    async fn put_record(&self, record: &ConversationRecord) -> Result<()>;
}
