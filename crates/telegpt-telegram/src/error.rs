//! Error types for the Telegram front end.

use telegpt_core::BotError;
use telegpt_persistence::PersistenceError;
use thiserror::Error;

/// Errors that can stop the bot process.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Configuration or handler error from the core.
    #[error(transparent)]
    Bot(#[from] BotError),

    /// Conversation store could not be opened or provisioned.
    #[error("Store error: {0}")]
    Store(#[from] PersistenceError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook server failed.
    #[error("Webhook server error: {0}")]
    WebhookFailed(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
