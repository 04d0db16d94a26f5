use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::domain::PromptContext;

const DEFAULT_PROVIDER: &str = "openai";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Named system prompt variants, selected per request context
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPrompts {
    pub default: Option<String>,
    pub question_generation: Option<String>,
    pub evaluation: Option<String>,
    pub tutoring: Option<String>,
    pub analysis: Option<String>,
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

/// Generation knobs plus provider-specific extras
#[derive(Debug, Clone)]
pub struct LlmOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            extra: HashMap::new(),
        }
    }
}

/// Effective LLM configuration, resolved once at runtime initialization
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub api_endpoint: Option<String>,
    pub model_name: Option<String>,
    pub system_prompts: SystemPrompts,
    pub options: LlmOptions,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: None,
            api_endpoint: None,
            model_name: None,
            system_prompts: SystemPrompts::default(),
            options: LlmOptions::default(),
        }
    }
}

/// Shape of `config/llm/<provider>.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderFile {
    api_key: Option<String>,
    api_endpoint: Option<String>,
    model_name: Option<String>,
    #[serde(default)]
    system_prompts: SystemPrompts,
    #[serde(default)]
    options: ProviderFileOptions,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderFileOptions {
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    #[serde(flatten)]
    extra: HashMap<String, serde_json::Value>,
}

impl LlmConfig {
    /// Resolve the effective configuration: environment variables win over
    /// the provider's JSON config file, which wins over built-in defaults.
    pub fn load() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(&env, Path::new("config/llm"))
    }

    /// Testable core of `load`: same layering against an explicit
    /// environment map and config directory.
    pub fn load_from(env: &HashMap<String, String>, config_dir: &Path) -> Self {
        let provider = env
            .get("LLM_PROVIDER")
            .filter(|v| !v.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());

        let file = read_provider_file(config_dir, &provider).unwrap_or_default();

        let temperature = parse_env_number::<f32>(env, "LLM_TEMPERATURE")
            .or(file.options.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE);
        let max_tokens = parse_env_number::<u32>(env, "LLM_MAX_TOKENS")
            .or(file.options.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        Self {
            api_key: env.get("LLM_API_KEY").cloned().or(file.api_key),
            api_endpoint: env.get("LLM_API_ENDPOINT").cloned().or(file.api_endpoint),
            model_name: env.get("LLM_MODEL_NAME").cloned().or(file.model_name),
            system_prompts: file.system_prompts,
            options: LlmOptions {
                temperature,
                max_tokens,
                extra: file.options.extra,
            },
            provider,
        }
    }

    /// Resolve the system prompt for a request context, falling back to the
    /// default prompt when the variant is not configured.
    pub fn system_prompt_for(&self, context: &PromptContext) -> Option<&str> {
        let prompts = &self.system_prompts;
        let specific = match context {
            PromptContext::Default => None,
            PromptContext::QuestionGeneration => prompts.question_generation.as_deref(),
            PromptContext::Evaluation => prompts.evaluation.as_deref(),
            PromptContext::Tutoring => prompts.tutoring.as_deref(),
            PromptContext::Analysis => prompts.analysis.as_deref(),
            PromptContext::Custom(name) => prompts.custom.get(name).map(String::as_str),
        };
        specific.or(prompts.default.as_deref())
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_api_endpoint(mut self, api_endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(api_endpoint.into());
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

/// Read `<config_dir>/<provider>.json`. Missing or malformed files are
/// tolerated: they are logged and treated as absent.
fn read_provider_file(config_dir: &Path, provider: &str) -> Option<ProviderFile> {
    let path = config_dir.join(format!("{}.json", provider));

    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("No provider config file at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!(
                "Ignoring malformed provider config {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Parse a numeric environment value; unparseable values are logged and
/// treated as absent so the next source applies.
fn parse_env_number<T: std::str::FromStr>(env: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = env.get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}='{}'", key, raw);
            None
        }
    }
}
