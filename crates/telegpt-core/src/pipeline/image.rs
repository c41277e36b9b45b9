//! `/image` handling. Nothing here touches the conversation store.

use tracing::{info, warn};

use crate::error::{BotError, Result};
use crate::replies;
use crate::state::BotState;

/// Shortest accepted prompt, in characters.
pub const MIN_PROMPT_CHARS: usize = 10;

/// Checks an image prompt, returning it trimmed.
pub fn validate_prompt(prompt: &str) -> Result<&str> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(BotError::Validation(replies::PROMPT_MISSING.to_string()));
    }
    if prompt.chars().count() < MIN_PROMPT_CHARS {
        return Err(BotError::Validation(replies::PROMPT_TOO_SHORT.to_string()));
    }
    Ok(prompt)
}

/// Generates an image and sends it with the revised prompt as caption.
///
/// Generation and delivery failures are reported to the user with their
/// description; validation failures go back to the router.
pub async fn run(state: &BotState, chat_id: i64, prompt: &str) -> Result<()> {
    let prompt = validate_prompt(prompt)?;

    match generate_and_send(state, chat_id, prompt).await {
        Ok(()) => {
            info!(chat_id = %chat_id, "Generated image sent");
            Ok(())
        }
        Err(e) => {
            warn!(chat_id = %chat_id, error = %e, "Image generation failed");
            state
                .transport
                .send_text(chat_id, &replies::image_failed(&e))
                .await
        }
    }
}

async fn generate_and_send(state: &BotState, chat_id: i64, prompt: &str) -> Result<()> {
    let image = state.completion.generate_image(prompt).await?;
    state
        .transport
        .send_photo(chat_id, &image.url, image.revised_prompt.as_deref())
        .await
}
