//! Blocking operator prompts.
//!
//! The login flow only talks to [`Prompter`]; the terminal implementation
//! lives in [`terminal`] and tests script their own.

pub mod terminal;

pub use terminal::TerminalPrompter;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled")]
    Cancelled,
    #[error("terminal error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PromptError {
    fn from(error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::Interrupted {
            Self::Cancelled
        } else {
            Self::Io(error.to_string())
        }
    }
}

/// Request/response exchanges with the operator.
pub trait Prompter {
    /// Pick one of `options`; returns its index.
    fn select(&self, message: &str, options: &[&str]) -> Result<usize, PromptError>;

    /// Free-text answer, trimmed. With `required`, blank answers are refused.
    fn input(&self, message: &str, required: bool) -> Result<String, PromptError>;

    /// Like [`Prompter::input`] but the answer is not echoed.
    fn password(&self, message: &str, required: bool) -> Result<String, PromptError>;
}
