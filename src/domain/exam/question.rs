use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// The eight supported difficulty tiers, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Foundation,
    Easy,
    Medium,
    Advanced,
    Hard,
    Expert,
    Olympiad,
}

impl Difficulty {
    pub const ALL: [Difficulty; 8] = [
        Difficulty::Beginner,
        Difficulty::Foundation,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Advanced,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Olympiad,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Foundation => "Foundation",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Advanced => "Advanced",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
            Difficulty::Olympiad => "Olympiad",
        }
    }

    /// Fixed five-point instructional rubric included verbatim in the
    /// question generation prompt.
    pub fn guideline(&self) -> &'static str {
        match self {
            Difficulty::Beginner => {
                "Beginner level guidelines:\n\
                 - Test recognition and recall of single facts or definitions\n\
                 - Use short, direct sentences with everyday vocabulary\n\
                 - Require at most one step to reach the answer\n\
                 - Stay within the most fundamental ideas of the chapter\n\
                 - Avoid any combination of concepts or applied scenarios"
            }
            Difficulty::Foundation => {
                "Foundation level guidelines:\n\
                 - Test understanding of core definitions and standard notation\n\
                 - Use familiar textbook phrasing and direct questions\n\
                 - Require one or two routine steps to answer\n\
                 - Cover each targeted concept in isolation\n\
                 - Keep numerical values small and computation-free where possible"
            }
            Difficulty::Easy => {
                "Easy level guidelines:\n\
                 - Test comprehension of single concepts with light application\n\
                 - Mirror solved examples students have already seen\n\
                 - Require straightforward substitution or short explanations\n\
                 - Keep every question answerable within two minutes\n\
                 - Avoid multi-concept linking or unfamiliar contexts"
            }
            Difficulty::Medium => {
                "Medium level guidelines:\n\
                 - Test application of concepts in slightly novel settings\n\
                 - Combine at most two related concepts per question\n\
                 - Require two to four reasoning or calculation steps\n\
                 - Include standard numerical problems with clean values\n\
                 - Expect complete working, not just the final answer"
            }
            Difficulty::Advanced => {
                "Advanced level guidelines:\n\
                 - Test analysis and transfer of concepts across topics\n\
                 - Use unfamiliar contexts that reward genuine understanding\n\
                 - Require multi-step reasoning with intermediate results\n\
                 - Mix conceptual and computational demands in one question\n\
                 - Penalize memorized-answer patterns by varying surface details"
            }
            Difficulty::Hard => {
                "Hard level guidelines:\n\
                 - Test synthesis of three or more concepts in one problem\n\
                 - Use layered problem statements with extractable given data\n\
                 - Require justification of each non-obvious step\n\
                 - Include at least one non-routine twist per question\n\
                 - Demand precision in units, signs and boundary conditions"
            }
            Difficulty::Expert => {
                "Expert level guidelines:\n\
                 - Test deep mastery through proof-like or derivation questions\n\
                 - Use sparse problem statements that demand modeling choices\n\
                 - Require chains of five or more dependent reasoning steps\n\
                 - Include edge cases and degenerate configurations\n\
                 - Reward elegant shortcuts but accept rigorous brute force"
            }
            Difficulty::Olympiad => {
                "Olympiad level guidelines:\n\
                 - Test creative problem solving beyond the standard syllabus\n\
                 - Use original problems with no directly applicable template\n\
                 - Require insight-driven leaps, not procedural computation\n\
                 - Combine techniques from multiple chapters or even subjects\n\
                 - Design for partial credit across well-separated milestones"
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| DomainError::validation(format!("Unknown difficulty '{}'", s)))
    }
}

/// Question type as emitted by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Theory,
    Numerical,
}

impl QuestionType {
    pub fn is_mcq(&self) -> bool {
        matches!(self, QuestionType::Mcq)
    }
}

/// A single generated exam question.
///
/// Field names mirror the JSON contract the model is instructed to follow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub question: String,
    pub marks: u32,
    /// Model answer for theory/numerical, correct choice text for MCQ
    pub answer: String,
    /// MCQ only: exactly four choices labeled A-D
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<BTreeMap<String, String>>,
    /// MCQ only: the correct choice label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One section of an exam format (name, weight in marks, optional type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSection {
    pub name: String,
    pub marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
}

impl FormatSection {
    /// One question per 10 marks of section weight, at least one.
    pub fn question_count(&self) -> u32 {
        (self.marks / 10).max(1)
    }
}

/// Structural description of the exam to generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamFormat {
    pub sections: Vec<FormatSection>,
}

impl ExamFormat {
    pub fn total_marks(&self) -> u32 {
        self.sections.iter().map(|s| s.marks).sum()
    }

    pub fn total_questions(&self) -> u32 {
        self.sections.iter().map(|s| s.question_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tiers_have_five_point_guidelines() {
        for tier in Difficulty::ALL {
            let bullet_count = tier
                .guideline()
                .lines()
                .filter(|l| l.trim_start().starts_with("- "))
                .count();
            assert_eq!(bullet_count, 5, "tier {} should have 5 points", tier);
            assert!(tier.guideline().starts_with(tier.as_str()));
        }
    }

    #[test]
    fn test_difficulty_from_str_is_case_insensitive() {
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!("OLYMPIAD".parse::<Difficulty>().unwrap(), Difficulty::Olympiad);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_section_question_count() {
        let section = FormatSection {
            name: "A".to_string(),
            marks: 35,
            question_type: None,
        };
        assert_eq!(section.question_count(), 3);

        let tiny = FormatSection {
            name: "B".to_string(),
            marks: 5,
            question_type: None,
        };
        assert_eq!(tiny.question_count(), 1);
    }

    #[test]
    fn test_question_json_field_names() {
        let json = serde_json::json!({
            "type": "mcq",
            "question": "Which unit measures resistance?",
            "marks": 1,
            "answer": "Ohm",
            "choices": {"A": "Volt", "B": "Ohm", "C": "Ampere", "D": "Watt"},
            "correctAnswer": "B"
        });

        let question: Question = serde_json::from_value(json).unwrap();
        assert!(question.question_type.is_mcq());
        assert_eq!(question.correct_answer.as_deref(), Some("B"));
        assert_eq!(question.choices.as_ref().unwrap().len(), 4);
    }
}
