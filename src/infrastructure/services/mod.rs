//! Content orchestration: the only layer that knows the JSON shapes the
//! model is asked to produce for each exam task.

mod evaluation_service;
mod question_service;
mod skills_service;
mod tutor_service;

pub use evaluation_service::EvaluationService;
pub use question_service::{GenerateQuestionsRequest, QuestionService};
pub use skills_service::SkillsService;
pub use tutor_service::TutorService;

use crate::domain::DomainError;

/// Parse the model's text output as JSON, tolerating Markdown code fences
/// (models frequently fence their JSON even in JSON mode).
pub(crate) fn parse_json_payload(
    task: &str,
    content: &str,
) -> Result<serde_json::Value, DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::validation(format!(
            "{} failed: the model returned no content",
            task
        )));
    }

    serde_json::from_str(strip_code_fences(content)).map_err(|e| {
        DomainError::validation(format!("{} response is not valid JSON: {}", task, e))
    })
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(end) = rest.rfind("```") {
            return rest[..end].trim();
        }
    }
    trimmed
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::config::LlmConfig;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::LlmProvider;
    use crate::infrastructure::llm::{LlmRuntime, ProviderRegistry};

    /// Initialized runtime backed by a shared mock provider, so tests can
    /// inspect captured requests after the call.
    pub(crate) async fn runtime_with(provider: Arc<MockLlmProvider>) -> Arc<LlmRuntime> {
        let mut registry = ProviderRegistry::new();
        let shared = provider.clone();
        registry.register("mock", move |_| {
            Ok(shared.clone() as Arc<dyn LlmProvider>)
        });

        let runtime = Arc::new(LlmRuntime::new(registry));
        runtime
            .initialize_with(LlmConfig::default().with_provider("mock"))
            .await
            .unwrap();
        runtime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let payload = parse_json_payload("test", r#"{"a": 1}"#).unwrap();
        assert_eq!(payload["a"], 1);
    }

    #[test]
    fn test_parse_fenced_json() {
        let payload =
            parse_json_payload("test", "```json\n{\"questions\": []}\n```").unwrap();
        assert!(payload["questions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_content_is_an_error() {
        let error = parse_json_payload("Tutoring", "   ").unwrap_err();
        assert!(error.to_string().contains("no content"));
    }

    #[test]
    fn test_invalid_json_names_the_task() {
        let error = parse_json_payload("Question generation", "not json").unwrap_err();
        assert!(error.to_string().contains("Question generation"));
    }
}
