//! Core logic for TeleGPT, a single-admin Telegram chatbot backed by a
//! chat-completion API.
//!
//! The crate is transport-agnostic: inbound messages arrive as
//! [`IncomingMessage`](telegpt_models::IncomingMessage) values, replies leave
//! through a [`ChatTransport`], and model calls go through a
//! [`CompletionApi`]. Both the long-poll loop and the webhook handler feed
//! the same [`CommandRouter`].
//!
//! # Commands
//!
//! - `/start` - welcome message (public)
//! - `/clear` - clear the stored conversation (admin)
//! - `/image <prompt>` - generate an image (admin)
//! - any other text - chat turn with full history (admin)
//! - photo with caption - vision turn (admin)

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod replies;
pub mod router;
pub mod state;
pub mod transport;

pub use client::{ChatCompletion, CompletionApi, GeneratedImage, OpenAiClient};
pub use config::{load_env_files, Settings, StoreSettings};
pub use error::{BotError, ErrorKind, Result};
pub use router::{route, Action, CommandRouter};
pub use state::BotState;
pub use transport::ChatTransport;
