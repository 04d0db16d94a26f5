use serde::{Deserialize, Serialize};

/// Per-question evaluation entry in the grading report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEvaluation {
    pub question_number: u32,
    pub marks_awarded: f32,
    /// One of "strong", "developing", "weak" per the grading rubric
    pub conceptual_understanding: String,
    pub technical_accuracy: String,
    pub key_concepts: Vec<String>,
    pub misconceptions: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub exemplar_answer: String,
}

/// Structured grading report for an uploaded answer sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationReport {
    pub total_marks_awarded: f32,
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub questions: Vec<QuestionEvaluation>,
}

/// One section recognized in a question paper template image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSection {
    pub name: String,
    pub question_count: u32,
    pub marks_per_question: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

/// Structural analysis of an institution's question paper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAnalysis {
    pub sections: Vec<TemplateSection>,
    pub total_marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub special_instructions: Vec<String>,
}
