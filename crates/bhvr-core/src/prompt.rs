//! Prompting seam
//!
//! The core asks questions through [`Prompter`]; how they are rendered is
//! up to the implementation (cliclack in the `tui` module, scripted answers
//! in tests, defaults in non-interactive mode).

use thiserror::Error;

/// One labeled option of a select or multiselect prompt
#[derive(Debug, Clone)]
pub struct Choice<T> {
    pub value: T,
    pub label: String,
    pub hint: String,
}

impl<T> Choice<T> {
    pub fn new(value: T, label: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            hint: hint.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user declined or interrupted the prompt
    #[error("cancelled")]
    Cancelled,

    #[error("prompt failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Prompter {
    /// `false` when every answer is a default and nothing blocks
    fn is_interactive(&self) -> bool {
        true
    }

    fn input(&mut self, message: &str, default: &str) -> Result<String, PromptError>;

    fn select<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &T,
    ) -> Result<T, PromptError>;

    fn multiselect<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &[T],
    ) -> Result<Vec<T>, PromptError>;

    fn confirm(&mut self, message: &str, initial: bool) -> Result<bool, PromptError>;
}

/// Answers every prompt with its default (`--yes` mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn is_interactive(&self) -> bool {
        false
    }

    fn input(&mut self, _message: &str, default: &str) -> Result<String, PromptError> {
        Ok(default.to_string())
    }

    fn select<T: Clone + Eq>(
        &mut self,
        _message: &str,
        _choices: &[Choice<T>],
        initial: &T,
    ) -> Result<T, PromptError> {
        Ok(initial.clone())
    }

    fn multiselect<T: Clone + Eq>(
        &mut self,
        _message: &str,
        _choices: &[Choice<T>],
        initial: &[T],
    ) -> Result<Vec<T>, PromptError> {
        Ok(initial.to_vec())
    }

    fn confirm(&mut self, _message: &str, initial: bool) -> Result<bool, PromptError> {
        Ok(initial)
    }
}
