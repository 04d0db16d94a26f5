use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

use super::http_client::HttpClient;
use super::openai::OpenAiProvider;
use crate::config::LlmConfig;
use crate::domain::{
    ChatMessage, CompletionRequest, CompletionResponse, DomainError, ImageGeneration, LlmProvider,
};

/// Factory closure producing a provider from resolved configuration
pub type ProviderFactory =
    Box<dyn Fn(&LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> + Send + Sync>;

/// Name-keyed provider factories. Built once during wiring, read-only
/// afterward; registration order does not matter.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in hosted provider. The self-hosted provider
    /// is intentionally not here; callers wire it up explicitly.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("openai", |config| {
            let provider = OpenAiProvider::from_config(HttpClient::new(), config)?;
            Ok(Arc::new(provider))
        });
        registry
    }

    /// Record a factory under a name; the last registration wins.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Registered provider names, for diagnostics.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the provider named by `config.provider`.
    pub fn create(&self, config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let factory = self
            .factories
            .get(&config.provider)
            .ok_or_else(|| DomainError::provider_not_registered(&config.provider))?;

        factory(config).map_err(|e| {
            DomainError::provider(&config.provider, format!("initialization failed: {}", e))
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

/// The default provider plus the configuration it was built from.
///
/// `complete` applies the configured per-context system prompt and fills
/// unset generation knobs before delegating to the provider.
#[derive(Debug)]
pub struct LlmHandle {
    config: LlmConfig,
    provider: Arc<dyn LlmProvider>,
}

impl LlmHandle {
    pub fn new(config: LlmConfig, provider: Arc<dyn LlmProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    pub fn image_generation(&self) -> Option<&dyn ImageGeneration> {
        self.provider.image_generation()
    }

    pub async fn complete(
        &self,
        mut request: CompletionRequest,
    ) -> Result<CompletionResponse, DomainError> {
        if let Some(context) = &request.context {
            if !request.has_system_message() {
                if let Some(prompt) = self.config.system_prompt_for(context) {
                    request.messages.insert(0, ChatMessage::system(prompt));
                }
            }
        }

        if request.temperature.is_none() {
            request.temperature = Some(self.config.options.temperature);
        }
        if request.max_tokens.is_none() {
            request.max_tokens = Some(self.config.options.max_tokens);
        }

        self.provider.complete(request).await
    }
}

/// Application context for the LLM subsystem: a registry plus the lazily
/// initialized default handle. Passed explicitly to the orchestration
/// services instead of living in module-level state.
#[derive(Debug)]
pub struct LlmRuntime {
    registry: ProviderRegistry,
    handle: OnceCell<Arc<LlmHandle>>,
}

impl LlmRuntime {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            handle: OnceCell::new(),
        }
    }

    pub fn with_builtins() -> Self {
        Self::new(ProviderRegistry::with_builtins())
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Bootstrap with configuration resolved from the environment.
    pub async fn initialize(&self) -> Result<Arc<LlmHandle>, DomainError> {
        self.init_inner(None).await
    }

    /// Bootstrap with an explicit configuration override.
    pub async fn initialize_with(&self, config: LlmConfig) -> Result<Arc<LlmHandle>, DomainError> {
        self.init_inner(Some(config)).await
    }

    /// Idempotent: the OnceCell guard makes concurrent callers await the
    /// same in-flight initialization, so exactly one default provider
    /// instance is ever constructed.
    async fn init_inner(
        &self,
        config: Option<LlmConfig>,
    ) -> Result<Arc<LlmHandle>, DomainError> {
        self.handle
            .get_or_try_init(|| async {
                let config = config.unwrap_or_else(LlmConfig::load);
                let provider = self.registry.create(&config)?;
                info!("LLM runtime initialized with provider '{}'", provider.name());
                Ok(Arc::new(LlmHandle::new(config, provider)))
            })
            .await
            .cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// The default handle; an explicit error before initialization.
    pub fn handle(&self) -> Result<Arc<LlmHandle>, DomainError> {
        self.handle
            .get()
            .cloned()
            .ok_or(DomainError::NotInitialized)
    }

    /// The default provider; an explicit error before initialization.
    pub fn provider(&self) -> Result<Arc<dyn LlmProvider>, DomainError> {
        self.handle().map(|h| h.provider.clone())
    }

    /// One-off construction bypassing the default-instance cache.
    pub fn create_provider(&self, config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        self.registry.create(config)
    }
}
