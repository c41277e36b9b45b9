//! Persistence layer for TeleGPT.
//!
//! The whole conversation lives in one record keyed by `field = "messages"`.
//! [`ConversationStore`] exposes read-all, append and clear over a pluggable
//! [`RecordBackend`]:
//!
//! - [`DynamoDbBackend`] (feature `dynamodb`, on by default) for deployments
//! - [`JsonFileBackend`] for local runs, written with atomic renames
//! - [`MemoryBackend`] for tests and throwaway sessions
//!
//! # Example
//!
//! ```no_run
//! use telegpt_models::Turn;
//! use telegpt_persistence::{ConversationStore, JsonFileBackend};
//!
//! # async fn run() -> telegpt_persistence::Result<()> {
//! let store = ConversationStore::new(JsonFileBackend::new("/tmp/telegpt/conversation.json"));
//! store.provision().await?;
//! store.append(Turn::user("Hello")).await?;
//! let history = store.read_all().await?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod backend;
#[cfg(feature = "dynamodb")]
pub mod dynamodb;
pub mod error;
pub mod file_backend;
pub mod memory;
pub mod store;

pub use backend::RecordBackend;
#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbBackend;
pub use error::{PersistenceError, Result};
pub use file_backend::JsonFileBackend;
pub use memory::MemoryBackend;
pub use store::ConversationStore;
