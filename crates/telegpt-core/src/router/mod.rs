//! Command routing.
//!
//! [`route`] is a pure classification of one inbound message;
//! [`CommandRouter::handle`] applies the admin gate, runs the chosen action
//! and turns any failure into the reply the taxonomy calls for.

use std::sync::Arc;

use telegpt_models::IncomingMessage;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{BotError, ErrorKind, Result};
use crate::pipeline::{chat, image, vision};
use crate::replies;
use crate::state::BotState;


/// What to do with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    /// `/start`: public greeting.
    Welcome,
    /// `/clear`: wipe the stored conversation.
    Clear,
    /// `/image <prompt>`: the raw text after the command.
    GenerateImage { prompt: &'a str },
    /// Any other text.
    Chat { text: &'a str },
    /// A photo with a non-empty caption.
    Vision { caption: &'a str },
    /// A photo without a caption.
    MissingCaption,
    /// Anything else (stickers, voice, documents, ...).
    Unsupported,
}

impl Action<'_> {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Welcome => "welcome",
            Action::Clear => "clear",
            Action::GenerateImage { .. } => "image",
            Action::Chat { .. } => "chat",
            Action::Vision { .. } => "vision",
            Action::MissingCaption => "missing_caption",
            Action::Unsupported => "unsupported",
        }
    }

    /// Whether the action is restricted to the admin chat.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Action::Clear | Action::GenerateImage { .. } | Action::Chat { .. } | Action::Vision { .. }
        )
    }
}

/// Matches `/name`, optionally followed by `@BotName`, at the start of `text`.
///
/// Returns the remainder after the command token, or `None` if `text` is a
/// different command or no command at all.
fn strip_command<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let rest = text.strip_prefix('/')?.strip_prefix(name)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some('@') => {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            Some(&rest[end..])
        }
        Some(_) => None,
    }
}

/// Classifies an inbound message.
pub fn route(msg: &IncomingMessage) -> Action<'_> {
    if let Some(text) = msg.text.as_deref() {
        let trimmed = text.trim();

        if strip_command(trimmed, "start").is_some_and(str::is_empty) {
            return Action::Welcome;
        }
        if strip_command(trimmed, "clear").is_some_and(str::is_empty) {
            return Action::Clear;
        }
        if let Some(prompt) = strip_command(trimmed, "image") {
            return Action::GenerateImage { prompt };
        }
        return Action::Chat { text };
    }

    if msg.has_photo() {
        return match msg.caption.as_deref() {
            Some(caption) if !caption.trim().is_empty() => Action::Vision { caption },
            _ => Action::MissingCaption,
        };
    }

    Action::Unsupported
}

/// Dispatches inbound messages to the welcome, clear, image, chat and vision
/// handlers.
///
/// Clones share one turn lock: messages are handled one at a time no matter
/// how many entry points or connections feed the router, which keeps the
/// store's read-modify-write appends from interleaving.
#[derive(Clone)]
pub struct CommandRouter {
    state: Arc<BotState>,
    turn_lock: Arc<Mutex<()>>,
}

impl CommandRouter {
    /// Creates a router over shared state.
    pub fn new(state: Arc<BotState>) -> Self {
        Self {
            state,
            turn_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The shared state.
    pub fn state(&self) -> &BotState {
        &self.state
    }

    /// Handles one message to completion.
    ///
    /// User-facing failures are answered in the chat and yield `Ok`. An `Err`
    /// means the failure could not be shown to the user (store inconsistency,
    /// or the reply itself could not be sent); callers should log it.
    pub async fn handle(&self, msg: &IncomingMessage) -> Result<()> {
        let _turn = self.turn_lock.lock().await;
        let action = route(msg);
        info!(
            chat_id = %msg.chat_id,
            sender = %msg.sender_name,
            action = action.name(),
            "Message received"
        );

        match self.dispatch(msg, &action).await {
            Ok(()) => Ok(()),
            Err(e) => self.report(msg.chat_id, action.name(), e).await,
        }
    }

    async fn dispatch(&self, msg: &IncomingMessage, action: &Action<'_>) -> Result<()> {
        let state = self.state.as_ref();
        let chat_id = msg.chat_id;

        if action.requires_admin() && !state.settings.is_admin(chat_id) {
            return Err(BotError::Unauthorized);
        }

        match action {
            Action::Welcome => {
                state
                    .transport
                    .send_text(chat_id, &replies::welcome(&msg.sender_name))
                    .await
            }
            Action::Clear => {
                state.store.clear().await?;
                state
                    .transport
                    .send_text(chat_id, replies::CONVERSATION_CLEARED)
                    .await
            }
            Action::GenerateImage { prompt } => image::run(state, chat_id, prompt).await,
            Action::Chat { text } => chat::run(state, chat_id, text).await,
            Action::Vision { caption } => {
                let photo = msg
                    .largest_photo()
                    .ok_or_else(|| BotError::Validation(replies::UNSUPPORTED_CONTENT.to_string()))?;
                vision::run(state, chat_id, caption, photo).await
            }
            Action::MissingCaption => Err(BotError::Validation(replies::CAPTION_MISSING.to_string())),
            Action::Unsupported => {
                state
                    .transport
                    .send_text(chat_id, replies::UNSUPPORTED_CONTENT)
                    .await
            }
        }
    }

    /// The single catch-all boundary: every failure ends here exactly once.
    async fn report(&self, chat_id: i64, action: &str, err: BotError) -> Result<()> {
        let reply = match err.kind() {
            ErrorKind::Unauthorized => {
                warn!(chat_id = %chat_id, action, "Unauthorized command rejected");
                replies::ACCESS_DENIED.to_string()
            }
            ErrorKind::Validation => {
                debug!(chat_id = %chat_id, action, reason = %err, "Validation failed");
                err.to_string()
            }
            ErrorKind::ExternalService => {
                error!(chat_id = %chat_id, action, error = %err, "Handler failed");
                replies::request_failed(&err)
            }
            ErrorKind::StoreInconsistency => {
                error!(chat_id = %chat_id, action, error = %err, "Conversation store is inconsistent");
                return Err(err);
            }
        };

        self.state.transport.send_text(chat_id, &reply).await
    }
}
