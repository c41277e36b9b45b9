//! Runtime configuration.
//!
//! Settings are read once at start-up into an immutable [`Settings`] value
//! that is shared by reference; nothing looks at the environment afterwards.
//!
//! # Environment Variables
//!
//! Required:
//! - `BOT_TOKEN`: Telegram bot token from @BotFather
//! - `OPENAI_API_KEY`: completion API key
//! - `ADMIN_CHAT_ID`: the only chat allowed to use gated commands
//! - either `AWS_REGION` + `AWS_DYNAMODB`, or `CONVERSATION_FILE`
//!
//! Optional:
//! - `OPENAI_API_BASE` (default: `https://api.openai.com/v1`)
//! - `OPENAI_MODEL` (default: `gpt-3.5-turbo-1106`)
//! - `OPENAI_VISION_MODEL` (default: `gpt-4-vision-preview`)
//! - `OPENAI_IMAGE_MODEL` (default: `dall-e-3`)
//! - `TELEGRAM_WEBHOOK_PORT` (default: 8443)
//! - `TELEGPT_ENV_FILE`: extra settings file loaded before `.env.local`/`.env`

use std::path::PathBuf;

use tracing::debug;

use crate::error::{BotError, Result};

pub const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ADMIN_CHAT_ID_ENV: &str = "ADMIN_CHAT_ID";
pub const AWS_REGION_ENV: &str = "AWS_REGION";
pub const AWS_DYNAMODB_ENV: &str = "AWS_DYNAMODB";
pub const CONVERSATION_FILE_ENV: &str = "CONVERSATION_FILE";
pub const OPENAI_API_BASE_ENV: &str = "OPENAI_API_BASE";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const OPENAI_VISION_MODEL_ENV: &str = "OPENAI_VISION_MODEL";
pub const OPENAI_IMAGE_MODEL_ENV: &str = "OPENAI_IMAGE_MODEL";
pub const WEBHOOK_PORT_ENV: &str = "TELEGRAM_WEBHOOK_PORT";
pub const ENV_FILE_ENV: &str = "TELEGPT_ENV_FILE";

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-1106";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4-vision-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;

/// Where the conversation record lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    /// A DynamoDB table holding the single record.
    DynamoDb { region: String, table: String },
    /// A local JSON file.
    File { path: PathBuf },
}

/// Immutable bot configuration.
#[derive(Clone)]
pub struct Settings {
    pub bot_token: String,
    pub openai_api_key: String,
    /// AdminIdentity: the one chat permitted to issue gated commands.
    pub admin_chat_id: i64,
    pub store: StoreSettings,
    pub api_base: String,
    pub chat_model: String,
    pub vision_model: String,
    pub image_model: String,
    pub webhook_port: u16,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bot_token", &"<redacted>")
            .field("openai_api_key", &"<redacted>")
            .field("admin_chat_id", &self.admin_chat_id)
            .field("store", &self.store)
            .field("api_base", &self.api_base)
            .field("chat_model", &self.chat_model)
            .field("vision_model", &self.vision_model)
            .field("image_model", &self.image_model)
            .field("webhook_port", &self.webhook_port)
            .finish()
    }
}

impl Settings {
    /// Creates settings with default models, endpoint and port.
    pub fn new(
        bot_token: impl Into<String>,
        openai_api_key: impl Into<String>,
        admin_chat_id: i64,
        store: StoreSettings,
    ) -> Self {
        Self {
            bot_token: bot_token.into(),
            openai_api_key: openai_api_key.into(),
            admin_chat_id,
            store,
            api_base: DEFAULT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            webhook_port: DEFAULT_WEBHOOK_PORT,
        }
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| BotError::Configuration(format!("{} is not set", key)))
        };

        let admin_raw = require(ADMIN_CHAT_ID_ENV)?;
        let admin_chat_id = admin_raw.parse::<i64>().map_err(|_| {
            BotError::Configuration(format!(
                "{} must be an integer chat id, got '{}'",
                ADMIN_CHAT_ID_ENV, admin_raw
            ))
        })?;

        let store = match get(CONVERSATION_FILE_ENV) {
            Some(path) => StoreSettings::File { path: PathBuf::from(path) },
            None => StoreSettings::DynamoDb {
                region: require(AWS_REGION_ENV)?,
                table: require(AWS_DYNAMODB_ENV)?,
            },
        };

        let webhook_port = match get(WEBHOOK_PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                BotError::Configuration(format!("{} must be a port number, got '{}'", WEBHOOK_PORT_ENV, raw))
            })?,
            None => DEFAULT_WEBHOOK_PORT,
        };

        Ok(Self {
            bot_token: require(BOT_TOKEN_ENV)?,
            openai_api_key: require(OPENAI_API_KEY_ENV)?,
            admin_chat_id,
            store,
            api_base: get(OPENAI_API_BASE_ENV)
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            chat_model: get(OPENAI_MODEL_ENV).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            vision_model: get(OPENAI_VISION_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            image_model: get(OPENAI_IMAGE_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            webhook_port,
        })
    }

    /// Whether `chat_id` is the configured admin chat.
    pub fn is_admin(&self, chat_id: i64) -> bool {
        chat_id == self.admin_chat_id
    }
}

/// Loads settings files into the environment without overriding variables
/// that are already exported.
///
/// Order: `$TELEGPT_ENV_FILE`, `.env.local`, `.env`. Returns the files that
/// were found.
pub fn load_env_files() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = std::env::var(ENV_FILE_ENV) {
        if let Ok(()) = dotenvy::from_path(&path) {
            loaded.push(PathBuf::from(path));
        }
    }
    for name in [".env.local", ".env"] {
        if let Ok(path) = dotenvy::from_filename(name) {
            loaded.push(path);
        }
    }

    debug!(files = ?loaded, "Settings files loaded");
    loaded
}
