//! ExamGuru Core
//!
//! The LLM-backed engine behind an exam preparation platform:
//! - Provider-agnostic chat completion with an optional image capability
//! - OpenAI and self-hosted provider adapters behind one trait
//! - Layered configuration (environment over provider files over defaults)
//! - Exam content orchestration: question generation, answer evaluation,
//!   template analysis, tutoring and skills analysis
//! - A keyword parser for chat commands and a TTL cache for shared reports

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::LlmConfig;
pub use domain::command::{parse_command, CommandIntent, ParsedCommand};
pub use domain::exam::{Difficulty, Question};
pub use domain::{DomainError, LlmProvider};
pub use infrastructure::cache::ShareCache;
pub use infrastructure::llm::{LlmHandle, LlmRuntime, ProviderRegistry};
pub use infrastructure::services::{
    EvaluationService, GenerateQuestionsRequest, QuestionService, SkillsService, TutorService,
};
