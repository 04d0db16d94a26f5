use std::sync::Arc;

use super::parse_json_payload;
use crate::domain::exam::{ExamAttempt, SkillsAnalysis};
use crate::domain::{CompletionRequest, DomainError, PromptContext};
use crate::infrastructure::llm::LlmRuntime;

/// Derives a skills profile from a student's exam history
#[derive(Debug)]
pub struct SkillsService {
    runtime: Arc<LlmRuntime>,
}

impl SkillsService {
    pub fn new(runtime: Arc<LlmRuntime>) -> Self {
        Self { runtime }
    }

    pub async fn analyze(&self, attempts: &[ExamAttempt]) -> Result<SkillsAnalysis, DomainError> {
        if attempts.is_empty() {
            return Err(DomainError::validation(
                "Skills analysis requires at least one exam attempt",
            ));
        }

        let handle = self.runtime.handle()?;

        let serialized = serde_json::to_string_pretty(attempts)
            .map_err(|e| DomainError::internal(format!("Failed to serialize attempts: {}", e)))?;

        let prompt = format!(
            "Analyze this student's exam history and build a skills profile.\n\n\
             Exam attempts:\n{}\n\n{}",
            serialized, SKILLS_SCHEMA
        );

        let completion = handle
            .complete(
                CompletionRequest::builder()
                    .user(prompt)
                    .json()
                    .context(PromptContext::Analysis)
                    .build(),
            )
            .await?;

        let payload = parse_json_payload("Skills analysis", &completion.content)?;
        serde_json::from_value(payload).map_err(|e| {
            DomainError::validation(format!(
                "Skills analysis response does not match the profile schema: {}",
                e
            ))
        })
    }
}

const SKILLS_SCHEMA: &str = "Return a JSON object with exactly these fields: \
\"cognitiveSkills\" ({\"recall\", \"comprehension\", \"application\", \
\"analysis\", \"problemSolving\"}, each a {\"score\": 0-100, \"evidence\": \
string}), \"subjectSkills\" (object keyed by subject name, each value a \
{\"masteryLevel\": \"beginner\", \"developing\", \"proficient\" or \
\"advanced\", \"strongTopics\": array, \"weakTopics\": array}), \
\"learningStyle\" ({\"primaryStyle\", \"pace\", \"consistency\"}), \
\"progress\" ({\"trend\", \"strongestSubject\", \"weakestSubject\", \
\"averageScore\"}), and \"recommendations\" (array of {\"title\", \
\"description\", \"priority\"}).";

#[cfg(test)]
mod tests {
    use super::super::test_support::runtime_with;
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::ResponseFormat;

    fn attempts() -> Vec<ExamAttempt> {
        serde_json::from_value(serde_json::json!([
            {"subject": "Physics", "grade": "10", "difficulty": "Medium",
             "score": 72.0, "totalMarks": 100, "timeTakenMinutes": 55},
            {"subject": "Chemistry", "grade": "10", "difficulty": "Hard",
             "score": 58.0, "totalMarks": 100, "timeTakenMinutes": 60}
        ]))
        .unwrap()
    }

    fn profile_json() -> serde_json::Value {
        let rating = |score: u32| {
            serde_json::json!({"score": score, "evidence": "consistent across attempts"})
        };
        serde_json::json!({
            "cognitiveSkills": {
                "recall": rating(80),
                "comprehension": rating(70),
                "application": rating(65),
                "analysis": rating(60),
                "problemSolving": rating(62)
            },
            "subjectSkills": {
                "Physics": {"masteryLevel": "proficient", "strongTopics": ["mechanics"],
                            "weakTopics": ["optics"]}
            },
            "learningStyle": {"primaryStyle": "visual", "pace": "steady",
                              "consistency": "high"},
            "progress": {"trend": "improving", "strongestSubject": "Physics",
                         "weakestSubject": "Chemistry", "averageScore": 65.0},
            "recommendations": [{"title": "Revise stoichiometry",
                                 "description": "Target the weakest Chemistry topics first",
                                 "priority": "high"}]
        })
    }

    #[tokio::test]
    async fn test_analyze_parses_the_profile() {
        let provider = Arc::new(MockLlmProvider::new().with_response(profile_json().to_string()));
        let service = SkillsService::new(runtime_with(provider.clone()).await);

        let analysis = service.analyze(&attempts()).await.unwrap();
        assert_eq!(analysis.cognitive_skills.recall.score, 80);
        assert_eq!(analysis.progress.strongest_subject, "Physics");
        assert_eq!(analysis.recommendations.len(), 1);

        let sent = &provider.captured_requests()[0];
        assert_eq!(sent.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(sent.context, Some(PromptContext::Analysis));
        let prompt = sent.messages.last().unwrap().content_text().unwrap();
        assert!(prompt.contains("\"subject\": \"Physics\""));
        assert!(prompt.contains("cognitiveSkills"));
    }

    #[tokio::test]
    async fn test_no_attempts_is_rejected_without_a_model_call() {
        let provider = Arc::new(MockLlmProvider::new().with_response("unused"));
        let service = SkillsService::new(runtime_with(provider.clone()).await);

        let error = service.analyze(&[]).await.unwrap_err();
        assert!(error.to_string().contains("at least one exam attempt"));
        assert!(provider.captured_requests().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_profile_fails() {
        let provider = Arc::new(
            MockLlmProvider::new().with_response(r#"{"cognitiveSkills": "good"}"#.to_string()),
        );
        let service = SkillsService::new(runtime_with(provider).await);

        let error = service.analyze(&attempts()).await.unwrap_err();
        assert!(error.to_string().contains("profile schema"));
    }
}
