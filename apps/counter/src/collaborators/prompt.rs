//! # Operator Prompt
//!
//! Messages for the person at the counter, and yes/no questions back.

use std::io::{BufRead, Write};

/// Operator-facing collaborator.
pub trait OperatorPrompt: Send + Sync {
    /// Shows a message.
    fn notify(&self, message: &str);

    /// Asks a yes/no question.
    fn confirm(&self, question: &str) -> bool;
}

/// Prompt on the terminal.
///
/// A fixed answer is used while standard input belongs to the scanner, or
/// when the operator passed `--yes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePrompt {
    answer: Option<bool>,
}

impl ConsolePrompt {
    /// Reads the answer from standard input.
    pub fn interactive() -> Self {
        ConsolePrompt { answer: None }
    }

    /// Always answers `answer` without reading input.
    pub fn fixed(answer: bool) -> Self {
        ConsolePrompt {
            answer: Some(answer),
        }
    }
}

impl OperatorPrompt for ConsolePrompt {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }

    fn confirm(&self, question: &str) -> bool {
        if let Some(answer) = self.answer {
            println!("{} {}", question, if answer { "yes" } else { "no" });
            return answer;
        }

        print!("{} [y/N] ", question);
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(_) => parse_answer(&line),
            Err(_) => false,
        }
    }
}

fn parse_answer(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
