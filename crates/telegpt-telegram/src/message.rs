//! Conversion of teloxide messages into core messages.

use teloxide::types::Message;
use telegpt_models::{IncomingMessage, PhotoRef};

/// Name used when Telegram provides no first name.
pub const FALLBACK_NAME: &str = "there";

/// Builds the transport-independent view of a teloxide message.
///
/// The sender name prefers the private chat's first name and falls back to
/// the `from` user.
pub fn to_incoming(msg: &Message) -> IncomingMessage {
    let sender_name = msg
        .chat
        .first_name()
        .map(str::to_string)
        .or_else(|| msg.from.as_ref().map(|u| u.first_name.clone()))
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let photos = msg
        .photo()
        .map(|sizes| {
            sizes
                .iter()
                .map(|p| PhotoRef {
                    file_id: p.file.id.clone(),
                    width: p.width,
                    height: p.height,
                })
                .collect()
        })
        .unwrap_or_default();

    IncomingMessage {
        chat_id: msg.chat.id.0,
        sender_name,
        text: msg.text().map(str::to_string),
        caption: msg.caption().map(str::to_string),
        photos,
    }
}
