use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::exam::Difficulty;

/// Intent of a free-text chat command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandIntent {
    CreateTemplate,
    CreateExam,
    ViewPerformance,
    Help,
    Unknown,
}

/// Coarse timeframe for performance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    Today,
    Week,
    Month,
    Year,
    All,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::Week => "this week",
            Timeframe::Month => "this month",
            Timeframe::Year => "this year",
            Timeframe::All => "all time",
        }
    }
}

/// Exam category filter for performance queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamKind {
    Practice,
    Mock,
    Final,
    All,
}

impl ExamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamKind::Practice => "practice",
            ExamKind::Mock => "mock",
            ExamKind::Final => "final",
            ExamKind::All => "all",
        }
    }
}

/// Result of classifying one chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub intent: CommandIntent,
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub curriculum: Option<String>,
    pub difficulty: Option<String>,
    /// Exam intent only: requested question/mark count
    pub question_count: Option<u32>,
    pub timeframe: Timeframe,
    pub exam_kind: ExamKind,
}

const KNOWN_SUBJECTS: [&str; 10] = [
    "Physics",
    "Chemistry",
    "Mathematics",
    "Biology",
    "Computer Science",
    "Science",
    "English",
    "History",
    "Geography",
    "Economics",
];

const KNOWN_GRADES: [&str; 12] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12",
];

const KNOWN_CURRICULA: [&str; 5] = ["CBSE", "ICSE", "State Board", "IB", "IGCSE"];

static COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+)\s*(questions?|marks?|q)\b").unwrap());

/// Classify a chat message into an intent plus extracted slots.
///
/// Matching is ordered substring search on a lowercased copy; the first
/// matching intent wins. Slot extraction is a flat membership scan against
/// the known subject/grade/curriculum/difficulty lists, no fuzzy matching.
pub fn parse_command(input: &str) -> ParsedCommand {
    let lowered = input.to_lowercase();
    let intent = classify_intent(&lowered);

    let mut command = ParsedCommand {
        intent,
        subject: None,
        grade: None,
        curriculum: None,
        difficulty: None,
        question_count: None,
        timeframe: Timeframe::All,
        exam_kind: ExamKind::All,
    };

    match intent {
        CommandIntent::CreateTemplate | CommandIntent::CreateExam => {
            command.subject = find_phrase(&lowered, &KNOWN_SUBJECTS);
            command.grade = find_token(&lowered, &KNOWN_GRADES);
            command.curriculum = find_phrase(&lowered, &KNOWN_CURRICULA);
            command.difficulty = Difficulty::ALL
                .iter()
                .find(|d| lowered.contains(&d.as_str().to_lowercase()))
                .map(|d| d.as_str().to_string());

            if intent == CommandIntent::CreateExam {
                command.question_count = COUNT_RE
                    .captures(&lowered)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok());
            }
        }
        CommandIntent::ViewPerformance => {
            command.timeframe = classify_timeframe(&lowered);
            command.exam_kind = classify_exam_kind(&lowered);
        }
        CommandIntent::Help | CommandIntent::Unknown => {}
    }

    command
}

fn classify_intent(lowered: &str) -> CommandIntent {
    if lowered.contains("template") {
        CommandIntent::CreateTemplate
    } else if lowered.contains("exam")
        || lowered.contains("test paper")
        || (lowered.contains("generate") && lowered.contains("question"))
    {
        CommandIntent::CreateExam
    } else if lowered.contains("performance")
        || lowered.contains("progress")
        || lowered.contains("analytics")
        || lowered.contains("score")
    {
        CommandIntent::ViewPerformance
    } else if lowered.contains("help")
        || lowered.contains("what can you do")
        || lowered.contains("how do i")
    {
        CommandIntent::Help
    } else {
        CommandIntent::Unknown
    }
}

/// Case-insensitive substring match, preserving the canonical casing.
fn find_phrase(lowered: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .find(|name| lowered.contains(&name.to_lowercase()))
        .map(|name| name.to_string())
}

/// Whole-token match, so grade "1" never fires inside "10" or "12".
fn find_token(lowered: &str, known: &[&str]) -> Option<String> {
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    known
        .iter()
        .find(|name| tokens.iter().any(|t| t.eq_ignore_ascii_case(name)))
        .map(|name| name.to_string())
}

fn classify_timeframe(lowered: &str) -> Timeframe {
    if lowered.contains("today") {
        Timeframe::Today
    } else if lowered.contains("week") {
        Timeframe::Week
    } else if lowered.contains("month") {
        Timeframe::Month
    } else if lowered.contains("year") {
        Timeframe::Year
    } else {
        Timeframe::All
    }
}

fn classify_exam_kind(lowered: &str) -> ExamKind {
    if lowered.contains("practice") {
        ExamKind::Practice
    } else if lowered.contains("mock") {
        ExamKind::Mock
    } else if lowered.contains("final") {
        ExamKind::Final
    } else {
        ExamKind::All
    }
}
