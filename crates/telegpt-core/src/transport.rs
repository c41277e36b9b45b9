//! Chat transport seam.

use async_trait::async_trait;

use crate::error::Result;

/// Outbound side of the chat transport.
///
/// Implementations map their failures onto [`BotError::Transport`], except
/// [`download`](ChatTransport::download), which reports
/// [`BotError::ImageFetchFailed`] for non-success responses and network errors.
///
/// [`BotError::Transport`]: crate::BotError::Transport
/// [`BotError::ImageFetchFailed`]: crate::BotError::ImageFetchFailed
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends a text message.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Sends a photo by URL with an optional caption.
    async fn send_photo(&self, chat_id: i64, url: &str, caption: Option<&str>) -> Result<()>;

    /// Resolves a file identifier to a fetchable URL.
    async fn file_url(&self, file_id: &str) -> Result<String>;

    /// Downloads the bytes behind `url`.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
