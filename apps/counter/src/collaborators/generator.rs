//! # Payment Code Generator
//!
//! Turns a payment payload into something the customer can scan.
//!
//! The counter ships a text renderer only: it frames the payload so the
//! operator can hand it to whatever code display the shop uses. Image
//! rendering belongs to a real generator behind the same trait.

use super::CollaboratorError;

/// Widest payload line inside the frame.
const FRAME_WIDTH: usize = 44;

/// A payload rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCode {
    /// Exactly what was encoded.
    pub payload: String,
    /// Display form.
    pub text: String,
}

/// Code-generation collaborator.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self, payload: &str) -> Result<RenderedCode, CollaboratorError>;
}

/// Frames the payload in a box for the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodeGenerator;

impl CodeGenerator for TextCodeGenerator {
    fn generate(&self, payload: &str) -> Result<RenderedCode, CollaboratorError> {
        if payload.is_empty() {
            return Err(CollaboratorError::Failed {
                what: "Code generator".to_string(),
                reason: "nothing to encode".to_string(),
            });
        }

        let chars: Vec<char> = payload.chars().collect();
        let mut text = format!("┌{}┐\n", "─".repeat(FRAME_WIDTH + 2));
        for chunk in chars.chunks(FRAME_WIDTH) {
            let line: String = chunk.iter().collect();
            text.push_str(&format!("│ {:<width$} │\n", line, width = FRAME_WIDTH));
        }
        text.push_str(&format!("└{}┘", "─".repeat(FRAME_WIDTH + 2)));

        Ok(RenderedCode {
            payload: payload.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_long_payload() {
        let payload = "x".repeat(FRAME_WIDTH + 3);
        let code = TextCodeGenerator.generate(&payload).unwrap();

        assert_eq!(code.payload, payload);
        let lines: Vec<&str> = code.text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("│ xxx "));
    }

    #[test]
    fn test_empty_payload_fails() {
        assert!(TextCodeGenerator.generate("").is_err());
    }
}
