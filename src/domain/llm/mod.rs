//! LLM provider domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{ChatMessage, ContentPart, MessageRole};
pub use provider::{ImageGeneration, LlmProvider};
pub use request::{CompletionRequest, CompletionRequestBuilder, PromptContext, ResponseFormat};
pub use response::{CompletionResponse, ImageGenerationRequest, ImageGenerationResponse, Usage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
