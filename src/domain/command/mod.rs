//! Keyword-based chat command classification and canned replies

mod parser;
mod responder;

pub use parser::{parse_command, CommandIntent, ExamKind, ParsedCommand, Timeframe};
pub use responder::respond;
