//! # External Collaborators
//!
//! The pieces of checkout that talk to hardware or to the operator.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Payment method        Collaborator used                                │
//! │  ──────────────        ─────────────────                                │
//! │  cash / card           OperatorPrompt (notify only)                     │
//! │  qr                    CodeGenerator ──► rendered code ──► operator     │
//! │                        OperatorPrompt::confirm("payment received?")     │
//! │  qr-scan               CodeReader::start() ──► ScanSubscription          │
//! │                            │  ScanEvent::Decoded(text)                  │
//! │                            ▼                                            │
//! │                        CheckoutSession::review_scan                     │
//! │                            │                                            │
//! │                        cancel() on verify / timeout / operator exit     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each collaborator is a trait so tests (and other front ends) can swap in
//! their own.

pub mod generator;
pub mod prompt;
pub mod scanner;

pub use generator::{CodeGenerator, RenderedCode, TextCodeGenerator};
pub use prompt::{ConsolePrompt, OperatorPrompt};
pub use scanner::{
    ChannelCodeReader, CodeReader, ScanEvent, ScanSubscription, StdinCodeReader,
    UnavailableCodeReader,
};

use thiserror::Error;

/// Collaborator failures. The sale is never touched when one occurs.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The device or library is missing or refused to start.
    #[error("{0} is unavailable")]
    Unavailable(String),

    /// The collaborator started but failed part-way.
    #[error("{what} failed: {reason}")]
    Failed { what: String, reason: String },
}

/// The set of collaborators a checkout runs with.
pub struct Collaborators {
    pub generator: Box<dyn CodeGenerator>,
    pub reader: Box<dyn CodeReader>,
    pub prompt: Box<dyn OperatorPrompt>,
}

impl Collaborators {
    pub fn new(
        generator: impl CodeGenerator + 'static,
        reader: impl CodeReader + 'static,
        prompt: impl OperatorPrompt + 'static,
    ) -> Self {
        Collaborators {
            generator: Box::new(generator),
            reader: Box::new(reader),
            prompt: Box::new(prompt),
        }
    }
}
