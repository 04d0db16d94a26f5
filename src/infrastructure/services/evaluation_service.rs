use std::sync::Arc;
use tracing::debug;

use super::parse_json_payload;
use crate::domain::exam::{EvaluationReport, Question, TemplateAnalysis};
use crate::domain::{
    ChatMessage, CompletionRequest, ContentPart, DomainError, PromptContext,
};
use crate::infrastructure::llm::LlmRuntime;

/// Grades uploaded answer sheets and reads question paper templates
#[derive(Debug)]
pub struct EvaluationService {
    runtime: Arc<LlmRuntime>,
}

impl EvaluationService {
    pub fn new(runtime: Arc<LlmRuntime>) -> Self {
        Self { runtime }
    }

    /// Grade a photographed answer sheet against the exam's questions.
    ///
    /// The image is embedded as base64 inside the prompt text itself (one
    /// plain-text message), matching the wire behavior graders rely on.
    pub async fn evaluate_answers(
        &self,
        image_base64: &str,
        questions: &[Question],
    ) -> Result<EvaluationReport, DomainError> {
        let handle = self.runtime.handle()?;

        let serialized = serde_json::to_string_pretty(questions)
            .map_err(|e| DomainError::internal(format!("Failed to serialize questions: {}", e)))?;

        let prompt = format!(
            "Grade the student's handwritten answers in the image below against \
             these exam questions.\n\nQuestions:\n{}\n\n\
             Scoring rules: award rubric-based partial credit for theory and \
             numerical questions; MCQ answers score full marks on an exact \
             match with the correct choice and zero otherwise.\n\n{}\n\n\
             Answer sheet image (base64):\n{}",
            serialized, EVALUATION_SCHEMA, image_base64
        );

        let completion = handle
            .complete(
                CompletionRequest::builder()
                    .user(prompt)
                    .json()
                    .context(PromptContext::Evaluation)
                    .build(),
            )
            .await?;

        let payload = parse_json_payload("Answer evaluation", &completion.content)?;
        let report: EvaluationReport = serde_json::from_value(payload).map_err(|e| {
            DomainError::validation(format!(
                "Answer evaluation response does not match the grading schema: {}",
                e
            ))
        })?;

        debug!(
            "Evaluated {} questions, {} marks awarded",
            report.questions.len(),
            report.total_marks_awarded
        );
        Ok(report)
    }

    /// Read the structure of a question paper from its image. Sends a true
    /// multimodal message: instructions as a text part, the paper as an
    /// image part.
    pub async fn analyze_template(
        &self,
        image_base64: &str,
    ) -> Result<TemplateAnalysis, DomainError> {
        let handle = self.runtime.handle()?;

        let message = ChatMessage::user_with_parts(vec![
            ContentPart::text(
                "Describe the structure of this question paper as JSON with \
                 exactly these fields: \"sections\" (array of {\"name\", \
                 \"questionCount\", \"marksPerQuestion\", \"questionType\"}), \
                 \"totalMarks\" (integer), \"duration\" (string), and \
                 \"specialInstructions\" (array of strings).",
            ),
            ContentPart::image_base64(image_base64, "image/jpeg"),
        ]);

        let completion = handle
            .complete(
                CompletionRequest::builder()
                    .message(message)
                    .json()
                    .context(PromptContext::Analysis)
                    .build(),
            )
            .await?;

        let payload = parse_json_payload("Template analysis", &completion.content)?;
        serde_json::from_value(payload).map_err(|e| {
            DomainError::validation(format!(
                "Template analysis response does not match the template schema: {}",
                e
            ))
        })
    }
}

const EVALUATION_SCHEMA: &str = "Return a JSON object with exactly these fields: \
\"totalMarksAwarded\" (number), \"summary\" (string), \"strengths\" (array of \
strings), \"improvements\" (array of strings), and \"questions\": an array with \
one entry per question, each having \"questionNumber\", \"marksAwarded\", \
\"conceptualUnderstanding\" (\"strong\", \"developing\" or \"weak\"), \
\"technicalAccuracy\", \"keyConcepts\" (array), \"misconceptions\" (array), \
\"improvementAreas\" (array), and \"exemplarAnswer\".";
