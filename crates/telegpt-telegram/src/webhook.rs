//! Webhook request handler.
//!
//! Telegram (directly, or through an API-Gateway style proxy) POSTs updates
//! to `/webhook`. Every request is answered with HTTP 200 so the sender
//! never retries; the JSON body says whether the update was handled,
//! ignored, or failed. Requests are served concurrently, but the
//! [`CommandRouter`] handles one message at a time.

use axum::{extract::State, routing::get, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use telegpt_core::CommandRouter;
use telegpt_models::{IncomingMessage, PhotoRef};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::message::FALLBACK_NAME;

/// Subset of a Telegram `Update` the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUpdate {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<WireMessage>,
}

/// Subset of a Telegram `Message`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub chat: WireChat,
    #[serde(default)]
    pub from: Option<WireUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Vec<WirePhotoSize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChat {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WirePhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

impl From<WireMessage> for IncomingMessage {
    fn from(msg: WireMessage) -> Self {
        let sender_name = msg
            .chat
            .first_name
            .or_else(|| msg.from.map(|u| u.first_name))
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        IncomingMessage {
            chat_id: msg.chat.id,
            sender_name,
            text: msg.text,
            caption: msg.caption,
            photos: msg
                .photo
                .into_iter()
                .map(|p| PhotoRef {
                    file_id: p.file_id,
                    width: p.width,
                    height: p.height,
                })
                .collect(),
        }
    }
}

/// Parses a request body into an update.
///
/// Accepts a bare update, or an envelope whose `body` field carries the
/// update either as a JSON string or as an object.
pub fn parse_update(raw: &str) -> serde_json::Result<WireUpdate> {
    let value: Value = serde_json::from_str(raw)?;
    match value.get("body") {
        Some(Value::String(inner)) => serde_json::from_str(inner),
        Some(inner @ Value::Object(_)) => serde_json::from_value(inner.clone()),
        _ => serde_json::from_value(value),
    }
}

/// Outcome reported back to the webhook caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Handled,
    Ignored,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: WebhookStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /webhook
async fn handle_update(State(router): State<CommandRouter>, body: String) -> Json<WebhookResponse> {
    let status = match parse_update(&body) {
        Err(e) => {
            warn!(error = %e, "Malformed webhook payload");
            WebhookStatus::Error
        }
        Ok(WireUpdate { update_id, message: None }) => {
            debug!(?update_id, "Update without message ignored");
            WebhookStatus::Ignored
        }
        Ok(WireUpdate { message: Some(message), .. }) => {
            let incoming = IncomingMessage::from(message);
            match router.handle(&incoming).await {
                Ok(()) => WebhookStatus::Handled,
                Err(e) => {
                    error!(chat_id = %incoming.chat_id, error = %e, "Failed to handle message");
                    WebhookStatus::Error
                }
            }
        }
    };

    Json(WebhookResponse { status })
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Creates the webhook router.
pub fn create_router(router: CommandRouter) -> Router {
    Router::new()
        .route("/webhook", post(handle_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(router)
}

/// Starts the webhook server.
pub async fn serve(port: u16, router: CommandRouter) -> Result<(), std::io::Error> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Webhook server listening on {}", addr);
    axum::serve(listener, create_router(router)).await
}
