//! Telegram front end for TeleGPT.
//!
//! This crate wires the transport-agnostic [`telegpt_core::CommandRouter`]
//! to Telegram in two deployment shapes:
//!
//! - long polling via teloxide ([`TelegramBot::start_polling`])
//! - a webhook request handler via axum ([`TelegramBot::serve_webhook`]),
//!   accepting raw Telegram updates or API-Gateway style `{"body": "..."}`
//!   envelopes
//!
//! # Environment Variables
//!
//! See [`telegpt_core::config`]. In short: `BOT_TOKEN`, `OPENAI_API_KEY`,
//! `ADMIN_CHAT_ID`, and either `AWS_REGION` + `AWS_DYNAMODB` or
//! `CONVERSATION_FILE`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use telegpt_core::Settings;
//! use telegpt_telegram::{open_store, TelegramBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Arc::new(Settings::from_env()?);
//!     let store = open_store(&settings.store).await?;
//!     let bot = TelegramBot::new(settings, store);
//!
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```

pub mod bot;
pub mod error;
pub mod message;
pub mod transport;
pub mod webhook;

pub use bot::{open_store, TelegramBot};
pub use error::{Result, TelegramError};
pub use transport::TelegramTransport;
pub use webhook::create_router;
