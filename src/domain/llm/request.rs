use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Hint for the shape of the model's output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// Tag selecting which configured system prompt variant frames the request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptContext {
    Default,
    QuestionGeneration,
    Evaluation,
    Tutoring,
    Analysis,
    Custom(String),
}

/// Parameters for a chat completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<PromptContext>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            response_format: None,
            context: None,
        }
    }

    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    pub fn wants_json(&self) -> bool {
        self.response_format == Some(ResponseFormat::JsonObject)
    }

    pub fn has_system_message(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.role == super::MessageRole::System)
    }
}

/// Builder for CompletionRequest
#[derive(Debug, Default)]
pub struct CompletionRequestBuilder {
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    response_format: Option<ResponseFormat>,
    context: Option<PromptContext>,
}

impl CompletionRequestBuilder {
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::system(content))
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::assistant(content))
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask the provider for a JSON object response
    pub fn json(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }

    pub fn context(mut self, context: PromptContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn build(self) -> CompletionRequest {
        CompletionRequest {
            messages: self.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: self.response_format,
            context: self.context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::builder()
            .system("You are an exam tutor")
            .user("What is Ohm's law?")
            .temperature(0.7)
            .max_tokens(500)
            .build();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(500));
        assert!(!request.wants_json());
        assert!(request.has_system_message());
    }

    #[test]
    fn test_json_mode_and_context() {
        let request = CompletionRequest::builder()
            .user("Generate questions")
            .json()
            .context(PromptContext::QuestionGeneration)
            .build();

        assert!(request.wants_json());
        assert_eq!(request.context, Some(PromptContext::QuestionGeneration));
        assert!(!request.has_system_message());
    }
}
