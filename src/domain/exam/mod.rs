//! Exam domain models: questions, formats, grading and analysis payloads

mod evaluation;
mod question;
mod skills;

pub use evaluation::{EvaluationReport, QuestionEvaluation, TemplateAnalysis, TemplateSection};
pub use question::{Difficulty, ExamFormat, FormatSection, Question, QuestionType};
pub use skills::{
    CognitiveSkills, ExamAttempt, LearningStyle, ProgressAnalysis, Recommendation, SkillRating,
    SkillsAnalysis, SubjectSkill,
};
