//! Fixed reply texts.

pub const ACCESS_DENIED: &str = "Currently, only the admin has access to this feature.";
pub const CONVERSATION_CLEARED: &str = "Conversation was cleared!";
pub const PROMPT_MISSING: &str = "Please provide a prompt for the image generation.";
pub const PROMPT_TOO_SHORT: &str = "Prompt is too short (min length: 10 chars).";
pub const CAPTION_MISSING: &str =
    "Please, provide some context for the image as captions, e.g.: \"What this image represents?\"";
pub const IMAGE_NOT_RETRIEVED: &str = "The image could not be retrieved.";
pub const IMAGE_PARSE_ERROR: &str = "There was an error while parsing the image.";
pub const PROCESSING_ERROR: &str = "There was an error while processing your request.";
pub const UNSUPPORTED_CONTENT: &str = "This type of content is not supported";

/// Greeting for `/start`.
pub fn welcome(name: &str) -> String {
    format!(
        "Hello, {}, welcome to the personal ChatGPT Telegram Chatbot!",
        name
    )
}

/// Reply for a failed image generation.
pub fn image_failed(error: &impl std::fmt::Display) -> String {
    format!("Error trying to generate the image: {}", error)
}

/// Reply for a failure caught at the handler boundary.
pub fn request_failed(error: &impl std::fmt::Display) -> String {
    format!("There was an error while processing your request: {}", error)
}

/// Appends the token-usage line to a chat reply.
pub fn with_token_usage(text: &str, total_tokens: u32) -> String {
    format!("{}\n\nTotal Tokens: {}", text, total_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_mentions_name() {
        let text = welcome("Renata");
        assert!(text.contains("Renata"));
        assert!(text.contains("welcome"));
    }

    #[test]
    fn test_token_usage_suffix() {
        assert_eq!(with_token_usage("Hi!", 57), "Hi!\n\nTotal Tokens: 57");
    }
}
