use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::HttpClientTrait;
use crate::config::LlmConfig;
use crate::domain::{
    ChatMessage, CompletionRequest, CompletionResponse, DomainError, LlmProvider, MessageRole,
};

const DEFAULT_SELF_HOSTED_URL: &str = "http://localhost:8080";
const DEFAULT_SELF_HOSTED_MODEL: &str = "default";

/// Completion-only provider for a self-hosted, OpenAI-compatible deployment.
///
/// Never advertises image generation. A bearer token is attached only when
/// one is configured.
#[derive(Debug)]
pub struct SelfHostedProvider<C: HttpClientTrait> {
    client: C,
    base_url: String,
    auth_header: Option<String>,
    model: String,
}

impl<C: HttpClientTrait> SelfHostedProvider<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            base_url: DEFAULT_SELF_HOSTED_URL.to_string(),
            auth_header: None,
            model: DEFAULT_SELF_HOSTED_MODEL.to_string(),
        }
    }

    pub fn from_config(client: C, config: &LlmConfig) -> Self {
        let mut provider = Self::new(client);

        if let Some(endpoint) = &config.api_endpoint {
            provider.base_url = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = config.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            provider.auth_header = Some(format!("Bearer {}", api_key));
        }
        if let Some(model) = &config.model_name {
            provider.model = model.clone();
        }

        provider
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(auth) = &self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": role_str(m),
                    "content": m.content_text().unwrap_or(""),
                })
            })
            .collect();

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

        body
    }
}

fn role_str(message: &ChatMessage) -> &'static str {
    match message.role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for SelfHostedProvider<C> {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(&request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        let parsed: SelfHostedResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider("self_hosted", format!("Failed to parse response: {}", e))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("self_hosted", "No choices in response"))?;

        Ok(CompletionResponse::new(
            choice.message.content.unwrap_or_default(),
        ))
    }

    fn name(&self) -> &'static str {
        "self_hosted"
    }
}

#[derive(Debug, Deserialize)]
struct SelfHostedResponse {
    choices: Vec<SelfHostedChoice>,
}

#[derive(Debug, Deserialize)]
struct SelfHostedChoice {
    message: SelfHostedMessage,
}

#[derive(Debug, Deserialize)]
struct SelfHostedMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LlmProvider as _;
    use crate::infrastructure::llm::http_client::mock::MockHttpClient;

    const LOCAL_URL: &str = "http://localhost:8080/v1/chat/completions";

    fn chat_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })
    }

    #[tokio::test]
    async fn test_defaults_to_local_endpoint() {
        let client = MockHttpClient::new().with_response(LOCAL_URL, chat_response("local reply"));
        let provider = SelfHostedProvider::new(client);

        let request = CompletionRequest::builder().user("ping").build();
        let response = provider.complete(request).await.unwrap();

        assert_eq!(response.content, "local reply");
    }

    #[tokio::test]
    async fn test_no_bearer_without_key() {
        let client = MockHttpClient::new().with_response(LOCAL_URL, chat_response("ok"));
        let provider = SelfHostedProvider::new(client);

        let request = CompletionRequest::builder().user("ping").build();
        provider.complete(request).await.unwrap();

        let headers = &provider.client.headers_seen()[0];
        assert!(headers.iter().all(|(k, _)| k != "Authorization"));
    }

    #[tokio::test]
    async fn test_bearer_attached_when_configured() {
        let config = LlmConfig::default()
            .with_provider("self_hosted")
            .with_api_key("token-1")
            .with_api_endpoint("http://llm.internal:9000")
            .with_model_name("llama-3");

        let client = MockHttpClient::new().with_response(
            "http://llm.internal:9000/v1/chat/completions",
            chat_response("ok"),
        );
        let provider = SelfHostedProvider::from_config(client, &config);

        let request = CompletionRequest::builder().user("ping").build();
        provider.complete(request).await.unwrap();

        let headers = &provider.client.headers_seen()[0];
        assert!(headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer token-1"));

        let (_, body) = &provider.client.requests()[0];
        assert_eq!(body["model"], "llama-3");
    }

    #[tokio::test]
    async fn test_no_image_capability() {
        let provider = SelfHostedProvider::new(MockHttpClient::new());
        assert!(provider.image_generation().is_none());
    }

    #[tokio::test]
    async fn test_http_error_carries_status_text() {
        let client = MockHttpClient::new().with_error(LOCAL_URL, "HTTP 503 Service Unavailable: ");
        let provider = SelfHostedProvider::new(client);

        let request = CompletionRequest::builder().user("ping").build();
        let error = provider.complete(request).await.unwrap_err();
        assert!(error.to_string().contains("503"));
    }
}
