use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{debug, warn};

use super::parse_json_payload;
use crate::domain::exam::{Difficulty, ExamFormat, Question, TemplateAnalysis};
use crate::domain::{
    CompletionRequest, DomainError, ImageGenerationRequest, PromptContext,
};
use crate::infrastructure::llm::{LlmHandle, LlmRuntime};

/// Inputs for exam generation
#[derive(Debug, Clone)]
pub struct GenerateQuestionsRequest {
    pub subject: String,
    pub curriculum: String,
    pub grade: String,
    pub difficulty: Difficulty,
    pub format: ExamFormat,
    pub templates: Vec<TemplateAnalysis>,
    pub selected_template: Option<TemplateAnalysis>,
    pub chapters: Option<Vec<String>>,
}

/// Generates exam question sets and rewrites them across difficulty tiers
#[derive(Debug)]
pub struct QuestionService {
    runtime: Arc<LlmRuntime>,
}

impl QuestionService {
    pub fn new(runtime: Arc<LlmRuntime>) -> Self {
        Self { runtime }
    }

    pub async fn generate_questions(
        &self,
        request: &GenerateQuestionsRequest,
    ) -> Result<Vec<Question>, DomainError> {
        let handle = self.runtime.handle()?;

        let prompt = build_generation_prompt(request);
        let completion = handle
            .complete(
                CompletionRequest::builder()
                    .user(prompt)
                    .json()
                    .context(PromptContext::QuestionGeneration)
                    .build(),
            )
            .await?;

        let payload = parse_json_payload("Question generation", &completion.content)?;
        let raw_questions = extract_questions(&payload)?;
        let mut questions = validate_questions(raw_questions)?;

        debug!("Generated {} questions", questions.len());
        self.attach_images(&handle, &mut questions).await;

        Ok(questions)
    }

    /// Rewrite an existing question set at a new difficulty tier, keeping
    /// count, structure and MCQ format intact.
    pub async fn adjust_difficulty(
        &self,
        questions: &[Question],
        new_difficulty: Difficulty,
        subject: &str,
        grade: &str,
    ) -> Result<Vec<Question>, DomainError> {
        let handle = self.runtime.handle()?;

        let prompt = build_adjustment_prompt(questions, new_difficulty, subject, grade)?;
        let completion = handle
            .complete(
                CompletionRequest::builder()
                    .user(prompt)
                    .json()
                    .context(PromptContext::QuestionGeneration)
                    .build(),
            )
            .await?;

        let payload = parse_json_payload("Difficulty adjustment", &completion.content)?;
        let raw_questions = payload
            .get("questions")
            .and_then(|q| q.as_array())
            .cloned()
            .ok_or_else(|| {
                DomainError::validation(
                    "Difficulty adjustment response is missing the 'questions' array",
                )
            })?;

        validate_questions(raw_questions)
    }

    /// Best-effort diagram generation for questions that describe one.
    /// Failures are logged and the question proceeds without an image.
    async fn attach_images(&self, handle: &LlmHandle, questions: &mut [Question]) {
        let Some(image_generation) = handle.image_generation() else {
            debug!("Provider has no image generation capability; skipping diagrams");
            return;
        };

        for question in questions.iter_mut() {
            let Some(description) = &question.image_description else {
                continue;
            };

            let prompt = format!(
                "Black and white minimalist educational diagram, clean lines, \
                 no shading, suitable for a printed exam paper: {}",
                description
            );

            match image_generation
                .generate_image(ImageGenerationRequest::new(prompt))
                .await
            {
                Ok(image) => question.image_url = Some(image.url),
                Err(e) => {
                    warn!("Diagram generation failed, continuing without image: {}", e);
                }
            }
        }
    }
}

fn build_generation_prompt(request: &GenerateQuestionsRequest) -> String {
    let mut prompt = format!(
        "Generate a {} {} exam for grade {} students following the {} curriculum.\n\n",
        request.difficulty, request.subject, request.grade, request.curriculum
    );

    if let Some(chapters) = request
        .chapters
        .as_ref()
        .filter(|chapters| !chapters.is_empty())
    {
        let _ = writeln!(
            prompt,
            "Restrict all questions to these chapters: {}.\n",
            chapters.join(", ")
        );
    }

    prompt.push_str(request.difficulty.guideline());
    prompt.push_str("\n\nExam structure (one question per 10 marks of section weight):\n");

    for section in &request.format.sections {
        let _ = write!(
            prompt,
            "- {}: {} question(s), {} marks total",
            section.name,
            section.question_count(),
            section.marks
        );
        if let Some(question_type) = &section.question_type {
            let _ = write!(prompt, ", type: {}", question_type);
        }
        prompt.push('\n');
    }

    if let Some(template) = &request.selected_template {
        prompt.push_str("\nMatch this institution's paper template:\n");
        describe_template(&mut prompt, template);
    }

    prompt.push_str(STRUCTURAL_REQUIREMENTS);
    prompt
}

fn describe_template(prompt: &mut String, template: &TemplateAnalysis) {
    for section in &template.sections {
        let _ = write!(
            prompt,
            "- {}: {} questions of {} marks each",
            section.name, section.question_count, section.marks_per_question
        );
        if let Some(question_type) = &section.question_type {
            let _ = write!(prompt, " ({})", question_type);
        }
        prompt.push('\n');
    }
    let _ = writeln!(prompt, "Total marks: {}", template.total_marks);
    if let Some(duration) = &template.duration {
        let _ = writeln!(prompt, "Duration: {}", duration);
    }
    for instruction in &template.special_instructions {
        let _ = writeln!(prompt, "Instruction: {}", instruction);
    }
}

const STRUCTURAL_REQUIREMENTS: &str = "\n\
Return a JSON object of the form {\"questions\": [...]}. Every question must \
have exactly these fields: \"type\" (one of \"mcq\", \"theory\", \"numerical\"), \
\"question\" (the full question text), \"marks\" (integer), and \"answer\" (the \
model answer). MCQ questions must additionally have \"choices\": an object with \
exactly the four keys \"A\", \"B\", \"C\", \"D\", and \"correctAnswer\": the label \
of the correct choice. Questions that need a diagram may include an \
\"imageDescription\" field describing it.";

fn build_adjustment_prompt(
    questions: &[Question],
    new_difficulty: Difficulty,
    subject: &str,
    grade: &str,
) -> Result<String, DomainError> {
    let serialized = serde_json::to_string_pretty(questions)
        .map_err(|e| DomainError::internal(format!("Failed to serialize questions: {}", e)))?;

    let mut prompt = format!(
        "Rewrite the following grade {} {} questions at {} difficulty.\n",
        grade, subject, new_difficulty
    );

    if let Some(guidance) = adjustment_guidance(new_difficulty) {
        prompt.push_str(guidance);
        prompt.push('\n');
    }

    let _ = write!(
        prompt,
        "Keep the same number of questions, the same marks, and the same \
         structure; MCQ questions must stay MCQs with four choices A-D and a \
         correctAnswer. Return a JSON object of exactly the form \
         {{\"questions\": [...]}}.\n\nQuestions:\n{}",
        serialized
    );

    Ok(prompt)
}

/// Rewrite guidance exists only for the Hard and Easy tiers; the other six
/// are left to the model's default behavior.
fn adjustment_guidance(difficulty: Difficulty) -> Option<&'static str> {
    match difficulty {
        Difficulty::Hard => Some(
            "Increase the cognitive demand: combine concepts, add a non-routine \
             twist, and require justification of intermediate steps.",
        ),
        Difficulty::Easy => Some(
            "Reduce the cognitive demand: single concepts, familiar phrasing, \
             and at most two short steps per question.",
        ),
        _ => None,
    }
}

/// Accept either a top-level `questions` array or `sections[].questions`
/// (flattened in section order).
fn extract_questions(payload: &serde_json::Value) -> Result<Vec<serde_json::Value>, DomainError> {
    if let Some(questions) = payload.get("questions").and_then(|q| q.as_array()) {
        return Ok(questions.clone());
    }

    if let Some(sections) = payload.get("sections").and_then(|s| s.as_array()) {
        let mut flattened = Vec::new();
        for section in sections {
            if let Some(questions) = section.get("questions").and_then(|q| q.as_array()) {
                flattened.extend(questions.iter().cloned());
            }
        }
        if !flattened.is_empty() {
            return Ok(flattened);
        }
    }

    Err(DomainError::validation(
        "Question generation response has no 'questions' array",
    ))
}

const REQUIRED_FIELDS: [&str; 4] = ["type", "question", "marks", "answer"];

fn validate_questions(raw: Vec<serde_json::Value>) -> Result<Vec<Question>, DomainError> {
    let mut questions = Vec::with_capacity(raw.len());

    for (index, value) in raw.into_iter().enumerate() {
        let number = index + 1;

        for field in REQUIRED_FIELDS {
            if value.get(field).is_none() {
                return Err(DomainError::validation(format!(
                    "Question {} is missing required field '{}'",
                    number, field
                )));
            }
        }

        if value["type"] == "mcq" {
            if value.get("choices").is_none() {
                return Err(DomainError::validation(format!(
                    "MCQ question {} is missing 'choices'",
                    number
                )));
            }
            if value.get("correctAnswer").is_none() {
                return Err(DomainError::validation(format!(
                    "MCQ question {} is missing 'correctAnswer'",
                    number
                )));
            }
        }

        let question: Question = serde_json::from_value(value).map_err(|e| {
            DomainError::validation(format!("Question {} is malformed: {}", number, e))
        })?;
        questions.push(question);
    }

    Ok(questions)
}
