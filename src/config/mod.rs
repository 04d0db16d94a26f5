//! Configuration loading

mod llm_config;

pub use llm_config::{LlmConfig, LlmOptions, SystemPrompts};
