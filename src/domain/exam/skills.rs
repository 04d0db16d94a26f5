use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A completed exam attempt, the input to the skills analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    pub subject: String,
    pub grade: String,
    pub difficulty: String,
    pub score: f32,
    pub total_marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
}

/// Score from 0-100 with a short justification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillRating {
    pub score: u32,
    pub evidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveSkills {
    pub recall: SkillRating,
    pub comprehension: SkillRating,
    pub application: SkillRating,
    pub analysis: SkillRating,
    pub problem_solving: SkillRating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSkill {
    pub mastery_level: String,
    pub strong_topics: Vec<String>,
    pub weak_topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyle {
    pub primary_style: String,
    pub pace: String,
    pub consistency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressAnalysis {
    pub trend: String,
    pub strongest_subject: String,
    pub weakest_subject: String,
    pub average_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: String,
}

/// Full skills analysis payload returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillsAnalysis {
    pub cognitive_skills: CognitiveSkills,
    pub subject_skills: BTreeMap<String, SubjectSkill>,
    pub learning_style: LearningStyle,
    pub progress: ProgressAnalysis,
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempt_serializes_camel_case() {
        let attempt = ExamAttempt {
            subject: "Physics".to_string(),
            grade: "10".to_string(),
            difficulty: "Medium".to_string(),
            score: 42.5,
            total_marks: 50,
            time_taken_minutes: Some(55),
            taken_at: None,
        };

        let json = serde_json::to_value(&attempt).unwrap();
        assert_eq!(json["totalMarks"], 50);
        assert_eq!(json["timeTakenMinutes"], 55);
    }
}
