use async_trait::async_trait;
use std::fmt::Debug;

use super::{CompletionRequest, CompletionResponse, ImageGenerationRequest, ImageGenerationResponse};
use crate::domain::DomainError;

/// Image generation capability, implemented only by providers that support it
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, DomainError>;
}

/// Trait for LLM backends (OpenAI, self-hosted deployments, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, DomainError>;

    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Explicit capability query for image generation. Callers check this
    /// once instead of probing for an optional method.
    fn image_generation(&self) -> Option<&dyn ImageGeneration> {
        None
    }
}
