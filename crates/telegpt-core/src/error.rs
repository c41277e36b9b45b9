//! Error types for the bot core.

use telegpt_persistence::PersistenceError;
use thiserror::Error;

/// Errors raised while handling a message.
#[derive(Debug, Error)]
pub enum BotError {
    /// A non-admin chat attempted a gated command.
    #[error("chat is not authorized for this command")]
    Unauthorized,

    /// User input failed validation; the message is shown to the user as-is.
    #[error("{0}")]
    Validation(String),

    /// Conversation store failure.
    #[error("store error: {0}")]
    Store(#[from] PersistenceError),

    /// Completion API could not be reached or answered unexpectedly.
    #[error("completion API error: {0}")]
    Completion(String),

    /// Completion API answered with a non-success status.
    #[error("completion API returned {status}: {body}")]
    CompletionStatus { status: u16, body: String },

    /// The attached image could not be downloaded.
    #[error("failed to fetch image: {0}")]
    ImageFetchFailed(String),

    /// Chat transport failure (sending replies, file metadata).
    #[error("transport error: {0}")]
    Transport(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// How an error is surfaced at the handler boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-visible access-denied notice, non-fatal.
    Unauthorized,
    /// User-visible validation message, non-fatal.
    Validation,
    /// Reported to the user with its description, non-fatal.
    ExternalService,
    /// Expected record missing or broken; logged, not shown to the user.
    StoreInconsistency,
}

impl BotError {
    /// Classifies the error for the handler boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BotError::Unauthorized => ErrorKind::Unauthorized,
            BotError::Validation(_) => ErrorKind::Validation,
            BotError::Store(e) if e.is_inconsistency() => ErrorKind::StoreInconsistency,
            _ => ErrorKind::ExternalService,
        }
    }
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(BotError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(BotError::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(
            BotError::Store(PersistenceError::RecordMissing { key: "messages".into() }).kind(),
            ErrorKind::StoreInconsistency
        );
        assert_eq!(
            BotError::Store(PersistenceError::Backend("throttled".into())).kind(),
            ErrorKind::ExternalService
        );
        assert_eq!(
            BotError::CompletionStatus { status: 500, body: String::new() }.kind(),
            ErrorKind::ExternalService
        );
    }

    #[test]
    fn test_validation_displays_message_verbatim() {
        let err = BotError::Validation("Prompt is too short (min length: 10 chars).".into());
        assert_eq!(err.to_string(), "Prompt is too short (min length: 10 chars).");
    }
}
