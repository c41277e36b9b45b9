//! Shared state handed to every handler.

use std::sync::Arc;

use telegpt_persistence::ConversationStore;

use crate::client::CompletionApi;
use crate::config::Settings;
use crate::transport::ChatTransport;

/// Everything a handler needs for one message.
///
/// The conversation store is the only source of truth for history; no copy
/// of the turns is kept here between messages.
pub struct BotState {
    pub settings: Arc<Settings>,
    pub store: ConversationStore,
    pub completion: Arc<dyn CompletionApi>,
    pub transport: Arc<dyn ChatTransport>,
}

impl BotState {
    /// Creates the state from its collaborators.
    pub fn new(
        settings: Arc<Settings>,
        store: ConversationStore,
        completion: Arc<dyn CompletionApi>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            settings,
            store,
            completion,
            transport,
        }
    }
}
