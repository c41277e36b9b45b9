//! Photo-with-caption handling.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use telegpt_models::{PhotoRef, Turn};
use tracing::{debug, info, warn};

use crate::error::{BotError, Result};
use crate::replies;
use crate::state::BotState;

/// Answers `caption` about the photo, then persists both turns.
///
/// The request is single-turn: stored history is not sent, and the reply
/// carries no token-usage line.
pub async fn run(state: &BotState, chat_id: i64, caption: &str, photo: &PhotoRef) -> Result<()> {
    let url = state.transport.file_url(&photo.file_id).await?;

    let bytes = match state.transport.download(&url).await {
        Ok(bytes) => bytes,
        Err(e @ BotError::ImageFetchFailed(_)) => {
            warn!(chat_id = %chat_id, error = %e, "Photo download failed");
            return state
                .transport
                .send_text(chat_id, replies::IMAGE_NOT_RETRIEVED)
                .await;
        }
        Err(e) => return Err(e),
    };

    debug!(chat_id = %chat_id, bytes = bytes.len(), "Photo downloaded");
    let encoded = STANDARD.encode(&bytes);

    let answer = match state.completion.describe_image(caption, &encoded).await {
        Ok(answer) => answer,
        Err(BotError::CompletionStatus { status, body }) => {
            warn!(chat_id = %chat_id, status, body = %body, "Vision request rejected");
            return state
                .transport
                .send_text(chat_id, replies::IMAGE_PARSE_ERROR)
                .await;
        }
        Err(e) => return Err(e),
    };

    state.transport.send_text(chat_id, &answer).await?;

    state.store.append(Turn::user(caption)).await?;
    state.store.append(Turn::assistant(answer)).await?;

    info!(chat_id = %chat_id, "Vision turn completed");
    Ok(())
}
