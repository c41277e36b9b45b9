//! teloxide-backed implementation of [`ChatTransport`].

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::InputFile;
use telegpt_core::{BotError, ChatTransport, Result};
use tracing::{debug, warn};

/// Telegram Bot API base URL for file downloads.
pub const FILE_API_BASE: &str = "https://api.telegram.org/file";

/// Maximum characters Telegram accepts in one text message.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Maximum characters Telegram accepts in a photo caption.
pub const MAX_CAPTION_CHARS: usize = 1024;

/// Sends replies and fetches photos through the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    http: reqwest::Client,
    token: String,
}

impl TelegramTransport {
    /// Create a transport for the given bot and token.
    pub fn new(bot: Bot, token: impl Into<String>) -> Self {
        Self {
            bot,
            http: reqwest::Client::new(),
            token: token.into(),
        }
    }

    /// Download URL for a file path returned by `getFile`.
    pub fn file_download_url(&self, file_path: &str) -> String {
        format!("{}/bot{}/{}", FILE_API_BASE, self.token, file_path)
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        for chunk in split_chars(text, MAX_MESSAGE_CHARS) {
            self.bot
                .send_message(ChatId(chat_id), chunk)
                .await
                .map_err(|e| BotError::Transport(e.to_string()))?;
        }
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, url: &str, caption: Option<&str>) -> Result<()> {
        let url = url::Url::parse(url)
            .map_err(|e| BotError::Transport(format!("invalid image url: {}", e)))?;

        let mut req = self.bot.send_photo(ChatId(chat_id), InputFile::url(url));
        if let Some(caption) = caption {
            req = req.caption(truncate_chars(caption, MAX_CAPTION_CHARS));
        }
        req.await.map_err(|e| BotError::Transport(e.to_string()))?;
        Ok(())
    }

    async fn file_url(&self, file_id: &str) -> Result<String> {
        let file = self
            .bot
            .get_file(file_id.to_string())
            .await
            .map_err(|e| BotError::ImageFetchFailed(e.to_string()))?;
        debug!(file_id = %file_id, path = %file.path, "Resolved Telegram file");
        Ok(self.file_download_url(&file.path))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::ImageFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Photo download rejected");
            return Err(BotError::ImageFetchFailed(format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BotError::ImageFetchFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Splits `text` into pieces of at most `max` characters.
///
/// Always yields at least one piece so empty replies still reach Telegram's
/// own validation.
fn split_chars(text: &str, max: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = text;
    while rest.chars().count() > max {
        let cut = rest
            .char_indices()
            .nth(max)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_chars("hello", 10), vec!["hello"]);
        assert_eq!(split_chars("", 10), vec![""]);
    }

    #[test]
    fn test_split_long_text() {
        let text = "abcdefghij";
        assert_eq!(split_chars(text, 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(split_chars(text, 5), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_split_respects_char_boundaries() {
        let text = "ééééé";
        let chunks = split_chars(text, 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("ünïcödé", 3), "ünï");
    }

    #[test]
    fn test_file_download_url() {
        let transport = TelegramTransport::new(Bot::new("123:abc"), "123:abc");
        assert_eq!(
            transport.file_download_url("photos/file_7.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_7.jpg"
        );
    }

    #[tokio::test]
    async fn test_download_returns_bytes() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/photos/file_7.jpg")
            .with_status(200)
            .with_body([0xffu8, 0xd8, 0xff])
            .create_async()
            .await;

        let transport = TelegramTransport::new(Bot::new("123:abc"), "123:abc");
        let bytes = transport
            .download(&format!("{}/photos/file_7.jpg", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, vec![0xff, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn test_download_not_found_is_image_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/photos/missing.jpg")
            .with_status(404)
            .create_async()
            .await;

        let transport = TelegramTransport::new(Bot::new("123:abc"), "123:abc");
        let result = transport
            .download(&format!("{}/photos/missing.jpg", server.url()))
            .await;

        assert!(matches!(result, Err(BotError::ImageFetchFailed(msg)) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_download_unreachable_is_image_fetch_failure() {
        let transport = TelegramTransport::new(Bot::new("123:abc"), "123:abc");
        let result = transport.download("http://127.0.0.1:1/photo.jpg").await;
        assert!(matches!(result, Err(BotError::ImageFetchFailed(_))));
    }
}
