//! The persisted conversation record.

use serde::{Deserialize, Serialize};

use crate::turn::Turn;

/// Name of the partition key attribute of the conversation table.
pub const RECORD_KEY_FIELD: &str = "field";

/// Fixed key value of the single conversation record.
pub const RECORD_KEY_VALUE: &str = "messages";

/// The single persisted row holding the full ordered turn history.
///
/// Exactly one record exists per deployment, shared by the admin chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Logical key, always [`RECORD_KEY_VALUE`].
    pub field: String,
    /// Turns in conversation order, oldest first.
    #[serde(default)]
    pub messages: Vec<Turn>,
}

impl ConversationRecord {
    /// Creates an empty record under the fixed key.
    pub fn empty() -> Self {
        Self {
            field: RECORD_KEY_VALUE.to_string(),
            messages: Vec::new(),
        }
    }

    /// Creates a record holding the given turns.
    pub fn with_turns(messages: Vec<Turn>) -> Self {
        Self {
            field: RECORD_KEY_VALUE.to_string(),
            messages,
        }
    }

    /// Number of stored turns.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the record holds no turns.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationRecord {
    fn default() -> Self {
        Self::empty()
    }
}
