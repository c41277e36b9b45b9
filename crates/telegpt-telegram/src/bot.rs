//! Bot wiring: store, completion client, transport and the two entry points.

use std::sync::Arc;

use teloxide::prelude::*;
use telegpt_core::{BotState, CommandRouter, OpenAiClient, Settings, StoreSettings};
use telegpt_persistence::{ConversationStore, JsonFileBackend};
use tracing::{error, info, warn};

use crate::error::{Result, TelegramError};
use crate::message::to_incoming;
use crate::transport::TelegramTransport;
use crate::webhook;

/// Opens the conversation store described by `settings`.
pub async fn open_store(settings: &StoreSettings) -> Result<ConversationStore> {
    match settings {
        StoreSettings::File { path } => {
            info!(path = %path.display(), "Using JSON file conversation store");
            Ok(ConversationStore::new(JsonFileBackend::new(path)))
        }
        #[cfg(feature = "dynamodb")]
        StoreSettings::DynamoDb { region, table } => {
            info!(region = %region, table = %table, "Using DynamoDB conversation store");
            let backend = telegpt_persistence::DynamoDbBackend::connect(region, table.as_str()).await;
            Ok(ConversationStore::new(backend))
        }
        #[cfg(not(feature = "dynamodb"))]
        StoreSettings::DynamoDb { .. } => Err(TelegramError::Bot(telegpt_core::BotError::Configuration(
            "built without DynamoDB support; set CONVERSATION_FILE instead".to_string(),
        ))),
    }
}

/// The Telegram bot.
pub struct TelegramBot {
    bot: Bot,
    router: CommandRouter,
}

impl TelegramBot {
    /// Create a bot backed by the OpenAI client and the Telegram transport.
    pub fn new(settings: Arc<Settings>, store: ConversationStore) -> Self {
        let bot = Bot::new(settings.bot_token.clone());
        let transport = Arc::new(TelegramTransport::new(bot.clone(), settings.bot_token.clone()));
        let completion = Arc::new(OpenAiClient::from_settings(&settings));
        let state = BotState::new(settings, store, completion, transport);

        Self {
            bot,
            router: CommandRouter::new(Arc::new(state)),
        }
    }

    /// The router every update goes through.
    pub fn router(&self) -> &CommandRouter {
        &self.router
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self
            .bot
            .get_me()
            .await
            .map_err(|e| TelegramError::BotStartFailed(e.to_string()))?;
        Ok(me.username().to_string())
    }

    /// Start the bot in long-polling mode.
    ///
    /// Runs until Ctrl-C. teloxide processes updates from one chat in order,
    /// so turns of the admin conversation never interleave.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let router = self.router.clone();
        let handler = Update::filter_message().endpoint(move |msg: Message| {
            let router = router.clone();
            async move {
                let incoming = to_incoming(&msg);
                if let Err(e) = router.handle(&incoming).await {
                    error!(chat_id = %incoming.chat_id, error = %e, "Failed to handle message");
                }
                respond(())
            }
        });

        info!("Bot is running! Send /start to begin.");

        Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                warn!("Unhandled update: {:?}", upd);
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        Ok(())
    }

    /// Serve the webhook request handler on `port`.
    ///
    /// The webhook URL itself is registered with Telegram out of band.
    pub async fn serve_webhook(&self, port: u16) -> Result<()> {
        webhook::serve(port, self.router.clone())
            .await
            .map_err(|e| TelegramError::WebhookFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telegpt_models::Turn;

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");
        let settings = StoreSettings::File { path: path.clone() };

        let store = open_store(&settings).await.unwrap();
        assert_eq!(store.backend_name(), "file");
        assert!(store.provision().await.unwrap());

        store.append(Turn::user("hello")).await.unwrap();
        let reopened = open_store(&settings).await.unwrap();
        assert_eq!(reopened.read_all().await.unwrap(), vec![Turn::user("hello")]);
    }
}
