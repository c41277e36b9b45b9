//! Inbound chat messages, independent of the transport library.

/// A photo attachment as offered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRef {
    /// Transport file identifier used to resolve a download URL.
    pub file_id: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PhotoRef {
    fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A message received from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
    /// Chat the message was sent in; replies go here.
    pub chat_id: i64,
    /// Display name of the sender (first name).
    pub sender_name: String,
    /// Message text, for text messages.
    pub text: Option<String>,
    /// Caption, for media messages.
    pub caption: Option<String>,
    /// Photo variants, smallest first as Telegram sends them.
    pub photos: Vec<PhotoRef>,
}

impl IncomingMessage {
    /// Creates a plain text message.
    pub fn text(chat_id: i64, sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            sender_name: sender_name.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Creates a photo message with an optional caption.
    pub fn photo(
        chat_id: i64,
        sender_name: impl Into<String>,
        photos: Vec<PhotoRef>,
        caption: Option<String>,
    ) -> Self {
        Self {
            chat_id,
            sender_name: sender_name.into(),
            caption,
            photos,
            ..Default::default()
        }
    }

    /// Whether the message carries a photo.
    pub fn has_photo(&self) -> bool {
        !self.photos.is_empty()
    }

    /// The largest-resolution photo variant.
    ///
    /// Falls back to the last variant when sizes tie, matching the order
    /// in which Telegram lists them.
    pub fn largest_photo(&self) -> Option<&PhotoRef> {
        self.photos
            .iter()
            .enumerate()
            .max_by_key(|(i, p)| (p.area(), *i))
            .map(|(_, p)| p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str, w: u32, h: u32) -> PhotoRef {
        PhotoRef {
            file_id: id.to_string(),
            width: w,
            height: h,
        }
    }

    #[test]
    fn test_largest_photo_picks_biggest_area() {
        let msg = IncomingMessage::photo(
            1,
            "Ana",
            vec![photo("small", 90, 90), photo("big", 1280, 960), photo("mid", 320, 240)],
            None,
        );
        assert_eq!(msg.largest_photo().unwrap().file_id, "big");
    }

    #[test]
    fn test_largest_photo_none_for_text() {
        let msg = IncomingMessage::text(1, "Ana", "hello");
        assert!(!msg.has_photo());
        assert!(msg.largest_photo().is_none());
    }
}
