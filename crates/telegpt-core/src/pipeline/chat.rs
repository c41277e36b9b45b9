//! Default text handling: one chat turn against the full stored history.

use telegpt_models::Turn;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::replies;
use crate::state::BotState;

/// Runs one chat turn.
///
/// The user turn is persisted before the completion call, so a failed call
/// leaves it in the history without an assistant reply. The whole history is
/// resent on every turn with no truncation; long conversations grow the
/// request without bound.
pub async fn run(state: &BotState, chat_id: i64, text: &str) -> Result<()> {
    state.store.append(Turn::user(text)).await?;
    let history = state.store.read_all().await?;

    debug!(chat_id = %chat_id, turns = history.len(), "Requesting chat completion");

    let completion = match state.completion.chat(&history).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(chat_id = %chat_id, error = %e, "Chat completion failed");
            state
                .transport
                .send_text(chat_id, replies::PROCESSING_ERROR)
                .await?;
            return Ok(());
        }
    };

    state
        .store
        .append(Turn::assistant(completion.content.clone()))
        .await?;

    let reply = replies::with_token_usage(&completion.content, completion.total_tokens);
    state.transport.send_text(chat_id, &reply).await?;

    info!(
        chat_id = %chat_id,
        total_tokens = completion.total_tokens,
        "Chat turn completed"
    );
    Ok(())
}
