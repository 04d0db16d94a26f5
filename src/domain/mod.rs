//! Domain models and contracts

pub mod command;
mod error;
pub mod exam;
pub mod llm;

pub use error::DomainError;
pub use llm::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, ImageGeneration,
    ImageGenerationRequest, ImageGenerationResponse, LlmProvider, MessageRole, PromptContext,
    ResponseFormat, Usage,
};
