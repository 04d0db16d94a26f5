use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::config::LlmConfig;
use crate::domain::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, DomainError, ImageGeneration,
    ImageGenerationRequest, ImageGenerationResponse, LlmProvider, MessageRole, ResponseFormat,
    Usage,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const IMAGE_MODEL: &str = "dall-e-3";

/// Hosted OpenAI provider: chat completions plus image generation
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
        }
    }

    /// Build from resolved configuration. A missing API key is a
    /// construction failure.
    pub fn from_config(client: C, config: &LlmConfig) -> Result<Self, DomainError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration("OpenAI provider requires an API key (LLM_API_KEY)")
            })?;

        let base_url = config
            .api_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL);

        let mut provider = Self::with_base_url(client, api_key, base_url);
        if let Some(model) = &config.model_name {
            provider.model = model.clone();
        }
        Ok(provider)
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn image_generations_url(&self) -> String {
        format!("{}/v1/images/generations", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> =
            request.messages.iter().map(wire_message).collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temperature) = request.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if request.response_format == Some(ResponseFormat::JsonObject) {
            body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<CompletionResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let mut completion = CompletionResponse::new(choice.message.content.unwrap_or_default())
            .with_model(response.model);

        if let Some(usage) = response.usage {
            completion =
                completion.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(completion)
    }
}

/// Convert a domain message to the OpenAI chat shape, preserving multimodal
/// part order. Base64 image parts are sent as data URLs.
fn wire_message(message: &ChatMessage) -> serde_json::Value {
    let role = match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    };

    if !message.is_multimodal() {
        return serde_json::json!({
            "role": role,
            "content": message.content_text().unwrap_or(""),
        });
    }

    let parts: Vec<serde_json::Value> = message
        .content_parts()
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => serde_json::json!({"type": "text", "text": text}),
            ContentPart::ImageUrl { url } => {
                serde_json::json!({"type": "image_url", "image_url": {"url": url}})
            }
            ContentPart::ImageBase64 { data, media_type } => serde_json::json!({
                "type": "image_url",
                "image_url": {"url": format!("data:{};base64,{}", media_type, data)}
            }),
        })
        .collect();

    serde_json::json!({"role": role, "content": parts})
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(response)
    }

    fn name(&self) -> &'static str {
        "openai"
    }

    fn image_generation(&self) -> Option<&dyn ImageGeneration> {
        Some(self)
    }
}

#[async_trait]
impl<C: HttpClientTrait> ImageGeneration for OpenAiProvider<C> {
    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, DomainError> {
        let body = serde_json::json!({
            "model": IMAGE_MODEL,
            "prompt": request.prompt,
            "n": request.n,
            "size": request.size,
            "quality": request.quality,
        });

        let url = self.image_generations_url();
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let parsed: OpenAiImageResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse image response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|item| ImageGenerationResponse { url: item.url })
            .ok_or_else(|| DomainError::provider("openai", "No images in response"))
    }
}

// OpenAI API types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageResponse {
    data: Vec<OpenAiImageItem>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageItem {
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
    const IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";

    fn chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19}
        })
    }

    #[tokio::test]
    async fn test_chat_completion() {
        let client = MockHttpClient::new().with_response(CHAT_URL, chat_response("Hello there"));
        let provider = OpenAiProvider::new(client, "test-key");

        let request = CompletionRequest::builder().user("Hello!").build();
        let response = provider.complete(request).await.unwrap();

        assert_eq!(response.content, "Hello there");
        assert_eq!(response.model.as_deref(), Some("gpt-4o"));
        assert_eq!(response.usage.unwrap().total_tokens, 19);
    }

    #[tokio::test]
    async fn test_request_carries_json_mode_and_knobs() {
        let client = MockHttpClient::new().with_response(CHAT_URL, chat_response("{}"));
        let provider = OpenAiProvider::new(client, "test-key");

        let request = CompletionRequest::builder()
            .user("Generate questions")
            .temperature(0.4)
            .max_tokens(1500)
            .json()
            .build();
        provider.complete(request).await.unwrap();

        let (_, body) = &provider.client.requests()[0];
        assert_eq!(body["temperature"], 0.4);
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["model"], "gpt-4o");
    }

    #[tokio::test]
    async fn test_multimodal_parts_preserve_order() {
        let client = MockHttpClient::new().with_response(CHAT_URL, chat_response("ok"));
        let provider = OpenAiProvider::new(client, "test-key");

        let request = CompletionRequest::new(vec![ChatMessage::user_with_parts(vec![
            ContentPart::text("Analyze this paper"),
            ContentPart::image_base64("QUJD", "image/png"),
        ])]);
        provider.complete(request).await.unwrap();

        let (_, body) = &provider.client.requests()[0];
        let parts = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(
            parts[1]["image_url"]["url"],
            "data:image/png;base64,QUJD"
        );
    }

    #[tokio::test]
    async fn test_from_config_requires_api_key() {
        let config = LlmConfig::default();
        let result = OpenAiProvider::from_config(MockHttpClient::new(), &config);
        assert!(matches!(
            result,
            Err(DomainError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_config_uses_endpoint_and_model() {
        let config = LlmConfig::default()
            .with_api_key("k")
            .with_api_endpoint("http://proxy.internal")
            .with_model_name("gpt-4o-mini");

        let client = MockHttpClient::new().with_response(
            "http://proxy.internal/v1/chat/completions",
            chat_response("hi"),
        );
        let provider = OpenAiProvider::from_config(client, &config).unwrap();

        let request = CompletionRequest::builder().user("hi").build();
        provider.complete(request).await.unwrap();

        let (url, body) = &provider.client.requests()[0];
        assert_eq!(url, "http://proxy.internal/v1/chat/completions");
        assert_eq!(body["model"], "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_image_generation() {
        let client = MockHttpClient::new().with_response(
            IMAGES_URL,
            serde_json::json!({"created": 1, "data": [{"url": "https://img.test/d.png"}]}),
        );
        let provider = OpenAiProvider::new(client, "test-key");

        let image = provider
            .image_generation()
            .unwrap()
            .generate_image(ImageGenerationRequest::new("a pulley system"))
            .await
            .unwrap();

        assert_eq!(image.url, "https://img.test/d.png");
        let (_, body) = &provider.client.requests()[0];
        assert_eq!(body["model"], "dall-e-3");
        assert_eq!(body["n"], 1);
    }

    #[tokio::test]
    async fn test_vendor_error_is_surfaced() {
        let client = MockHttpClient::new().with_error(CHAT_URL, "HTTP 429: rate limited");
        let provider = OpenAiProvider::new(client, "test-key");

        let request = CompletionRequest::builder().user("hi").build();
        let error = provider.complete(request).await.unwrap_err();
        assert!(error.to_string().contains("HTTP 429"));
    }
}
