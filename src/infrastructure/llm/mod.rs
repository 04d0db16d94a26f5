//! LLM provider adapters and runtime wiring

pub mod http_client;
mod openai;
mod registry;
mod self_hosted;

pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiProvider;
pub use registry::{LlmHandle, LlmRuntime, ProviderFactory, ProviderRegistry};
pub use self_hosted::SelfHostedProvider;
