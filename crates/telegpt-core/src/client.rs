//! Completion API client.
//!
//! [`CompletionApi`] is the seam the pipelines call; [`OpenAiClient`] is the
//! HTTP implementation for the OpenAI-compatible endpoints:
//! - `POST {base}/chat/completions` for text and vision turns
//! - `POST {base}/images/generations` for `/image`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use telegpt_models::Turn;
use tracing::{debug, trace};

use crate::config::Settings;
use crate::error::{BotError, Result};

/// Response-length cap for vision requests.
pub const VISION_MAX_TOKENS: u32 = 300;

/// Generated image size.
pub const IMAGE_SIZE: &str = "1024x1024";

/// Generated image quality.
pub const IMAGE_QUALITY: &str = "standard";

/// A text completion with its token usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub content: String,
    pub total_tokens: u32,
}

/// A generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Where the image can be fetched from.
    pub url: String,
    /// The prompt as rewritten by the model, used as the photo caption.
    pub revised_prompt: Option<String>,
}

/// External text/vision generation service.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Completes a conversation, resending the entire history.
    async fn chat(&self, history: &[Turn]) -> Result<ChatCompletion>;

    /// Answers `caption` about a base64-encoded JPEG in a single-turn request.
    async fn describe_image(&self, caption: &str, image_base64: &str) -> Result<String>;

    /// Generates one square image for `prompt`.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}

/// OpenAI-compatible HTTP client.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    chat_model: String,
    vision_model: String,
    image_model: String,
}

impl OpenAiClient {
    /// Creates a client from the bot settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.openai_api_key.clone(),
            api_base: settings.api_base.clone(),
            chat_model: settings.chat_model.clone(),
            vision_model: settings.vision_model.clone(),
            image_model: settings.image_model.clone(),
        }
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.api_base, path);
        trace!(url = %url, "Sending completion API request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Completion(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::CompletionStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| BotError::Completion(format!("failed to parse response: {}", e)))
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn chat(&self, history: &[Turn]) -> Result<ChatCompletion> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: history,
        };
        let response: ChatResponse = self.post_json("chat/completions", &request).await?;
        let completion = response.into_completion()?;

        debug!(
            model = %self.chat_model,
            turns = history.len(),
            total_tokens = completion.total_tokens,
            "Chat completion received"
        );
        Ok(completion)
    }

    async fn describe_image(&self, caption: &str, image_base64: &str) -> Result<String> {
        let request = VisionRequest::new(&self.vision_model, caption, image_base64);
        let response: ChatResponse = self.post_json("chat/completions", &request).await?;
        let content = response.first_content()?;

        debug!(model = %self.vision_model, "Vision completion received");
        Ok(content)
    }

    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let request = ImageRequest {
            model: &self.image_model,
            prompt,
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
        };
        let response: ImageResponse = self.post_json("images/generations", &request).await?;
        let image = response.into_image()?;

        debug!(model = %self.image_model, url = %image.url, "Image generated");
        Ok(image)
    }
}

/// Builds the inline data URI for a base64-encoded JPEG.
pub fn jpeg_data_uri(image_base64: &str) -> String {
    format!("data:image/jpeg;base64,{}", image_base64)
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
}

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    model: &'a str,
    messages: Vec<VisionMessage<'a>>,
    max_tokens: u32,
}

impl<'a> VisionRequest<'a> {
    fn new(model: &'a str, caption: &'a str, image_base64: &str) -> Self {
        Self {
            model,
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    ContentPart::Text { text: caption },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: jpeg_data_uri(image_base64),
                        },
                    },
                ],
            }],
            max_tokens: VISION_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Serialize)]
struct VisionMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'static str,
    quality: &'static str,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

impl ChatResponse {
    fn first_content(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BotError::Completion("response is missing choices[0].message.content".to_string()))
    }

    fn into_completion(self) -> Result<ChatCompletion> {
        let total_tokens = self
            .usage
            .as_ref()
            .map(|u| u.total_tokens)
            .ok_or_else(|| BotError::Completion("response is missing usage.total_tokens".to_string()))?;
        Ok(ChatCompletion {
            content: self.first_content()?,
            total_tokens,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}

impl ImageResponse {
    fn into_image(self) -> Result<GeneratedImage> {
        let first = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| BotError::Completion("image response has no data".to_string()))?;
        let url = first
            .url
            .ok_or_else(|| BotError::Completion("image response is missing data[0].url".to_string()))?;
        Ok(GeneratedImage {
            url,
            revised_prompt: first.revised_prompt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreSettings;
    use serde_json::json;

    fn client_for(api_base: &str) -> OpenAiClient {
        let mut settings = Settings::new(
            "123:token",
            "sk-test",
            1,
            StoreSettings::File { path: "unused.json".into() },
        );
        settings.api_base = api_base.to_string();
        OpenAiClient::from_settings(&settings)
    }

    #[test]
    fn test_chat_request_shape() {
        let history = vec![Turn::user("Hi"), Turn::assistant("Hello!"), Turn::user("Again")];
        let request = ChatRequest {
            model: "gpt-3.5-turbo-1106",
            messages: &history,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "gpt-3.5-turbo-1106");
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][1], json!({"role": "assistant", "content": "Hello!"}));
    }

    #[test]
    fn test_vision_request_shape() {
        let request = VisionRequest::new("gpt-4-vision-preview", "What is this?", "AAAA");
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4-vision-preview",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "What is this?"},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,AAAA"}}
                    ]
                }],
                "max_tokens": 300
            })
        );
    }

    #[test]
    fn test_image_request_shape() {
        let request = ImageRequest {
            model: "dall-e-3",
            prompt: "a sunset over mountains",
            size: IMAGE_SIZE,
            quality: IMAGE_QUALITY,
            n: 1,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["size"], "1024x1024");
        assert_eq!(body["quality"], "standard");
        assert_eq!(body["n"], 1);
    }

    #[test]
    fn test_parse_chat_response() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hey"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }))
        .unwrap();

        let completion = response.into_completion().unwrap();
        assert_eq!(completion, ChatCompletion { content: "Hey".into(), total_tokens: 12 });
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(response.first_content(), Err(BotError::Completion(_))));
    }

    #[test]
    fn test_parse_image_response() {
        let response: ImageResponse = serde_json::from_value(json!({
            "created": 1700000000,
            "data": [{"url": "https://img.example/1.png", "revised_prompt": "A vivid sunset"}]
        }))
        .unwrap();

        let image = response.into_image().unwrap();
        assert_eq!(image.url, "https://img.example/1.png");
        assert_eq!(image.revised_prompt.as_deref(), Some("A vivid sunset"));
    }

    #[tokio::test]
    async fn test_chat_over_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "Hello there"}}],
                    "usage": {"total_tokens": 21}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let completion = client_for(&server.url()).chat(&[Turn::user("Hi")]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion, ChatCompletion { content: "Hello there".into(), total_tokens: 21 });
    }

    #[tokio::test]
    async fn test_error_status_maps_to_completion_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Invalid image."}}"#)
            .create_async()
            .await;

        let result = client_for(&server.url()).describe_image("What is this?", "AAAA").await;

        mock.assert_async().await;
        match result {
            Err(BotError::CompletionStatus { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Invalid image."));
            }
            other => panic!("expected CompletionStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_image_generation_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/images/generations")
            .with_status(500)
            .with_body("upstream failure")
            .create_async()
            .await;

        let result = client_for(&server.url()).generate_image("a sunset over mountains").await;
        assert!(matches!(result, Err(BotError::CompletionStatus { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_api_maps_to_completion() {
        // Nothing listens on port 1.
        let result = client_for("http://127.0.0.1:1").chat(&[Turn::user("Hi")]).await;
        assert!(matches!(result, Err(BotError::Completion(_))));
    }

    #[tokio::test]
    async fn test_unparseable_body_maps_to_completion() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = client_for(&server.url()).chat(&[Turn::user("Hi")]).await;
        assert!(matches!(result, Err(BotError::Completion(_))));
    }
}
