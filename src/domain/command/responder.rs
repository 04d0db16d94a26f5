use super::parser::{CommandIntent, ParsedCommand};

/// Map a parsed command to a natural-language reply.
///
/// Pure function: no provider call is involved. Template and exam intents
/// that are missing the subject or grade get a clarifying question instead
/// of a confirmation.
pub fn respond(command: &ParsedCommand) -> String {
    match command.intent {
        CommandIntent::CreateTemplate => match (&command.subject, &command.grade) {
            (Some(subject), Some(grade)) => {
                let mut reply = format!(
                    "Sure, let's set up a question paper template for {} (grade {})",
                    subject, grade
                );
                if let Some(curriculum) = &command.curriculum {
                    reply.push_str(&format!(" following the {} curriculum", curriculum));
                }
                reply.push_str(". You can upload a sample paper image and I'll read its structure.");
                reply
            }
            _ => "I can create that template - which subject and grade is it for?".to_string(),
        },
        CommandIntent::CreateExam => match (&command.subject, &command.grade) {
            (Some(subject), Some(grade)) => {
                let mut reply = format!("Creating a {} exam for grade {}", subject, grade);
                if let Some(difficulty) = &command.difficulty {
                    reply.push_str(&format!(" at {} difficulty", difficulty));
                }
                if let Some(count) = command.question_count {
                    reply.push_str(&format!(" with {} questions", count));
                }
                reply.push('.');
                reply
            }
            _ => "Happy to create an exam - which subject and grade should it cover?".to_string(),
        },
        CommandIntent::ViewPerformance => format!(
            "Here's your performance summary for {} ({} exams).",
            command.timeframe.as_str(),
            command.exam_kind.as_str()
        ),
        CommandIntent::Help => "I can help you create question paper templates, generate exams, \
                                and review your performance. Try \"create an exam for Physics \
                                grade 10\" or \"show my performance this week\"."
            .to_string(),
        CommandIntent::Unknown => "I didn't catch that. I can create templates, generate exams, \
                                   or show your performance - what would you like to do?"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_command;
    use super::*;

    #[test]
    fn test_exam_reply_interpolates_slots() {
        let command = parse_command("create an exam for Physics grade 10 Hard with 15 questions");
        let reply = respond(&command);

        assert!(reply.contains("Physics"));
        assert!(reply.contains("grade 10"));
        assert!(reply.contains("Hard"));
        assert!(reply.contains("15 questions"));
    }

    #[test]
    fn test_missing_slots_yield_clarifying_question() {
        let command = parse_command("create an exam");
        let reply = respond(&command);
        assert!(reply.contains("which subject and grade"));
    }

    #[test]
    fn test_template_reply_mentions_curriculum() {
        let command = parse_command("new template for Chemistry grade 11 ICSE");
        let reply = respond(&command);
        assert!(reply.contains("ICSE"));
    }

    #[test]
    fn test_performance_reply() {
        let command = parse_command("show my progress this year");
        let reply = respond(&command);
        assert!(reply.contains("this year"));
    }
}
