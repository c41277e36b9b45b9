//! Core data models for TeleGPT.
//!
//! This crate provides the plain data types shared by the store, the
//! command router and the transport adapters: conversation turns, the
//! persisted conversation record and the inbound chat message.

pub mod message;
pub mod record;
pub mod turn;

pub use message::{IncomingMessage, PhotoRef};
pub use record::{ConversationRecord, RECORD_KEY_FIELD, RECORD_KEY_VALUE};
pub use turn::{Role, Turn};
