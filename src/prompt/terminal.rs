use dialoguer::console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password, Select};

use super::{PromptError, Prompter};

/// [`Prompter`] drawing on the diagnostic stream so stdout stays clean.
pub struct TerminalPrompter {
    term: Term,
    theme: ColorfulTheme,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select(&self, message: &str, options: &[&str]) -> Result<usize, PromptError> {
        Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact_on_opt(&self.term)
            .map_err(map_dialoguer)?
            .ok_or(PromptError::Cancelled)
    }

    fn input(&self, message: &str, required: bool) -> Result<String, PromptError> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(!required)
            .validate_with(|value: &String| require_text(required, value))
            .interact_text_on(&self.term)
            .map_err(map_dialoguer)?;
        Ok(answer.trim().to_string())
    }

    fn password(&self, message: &str, required: bool) -> Result<String, PromptError> {
        let answer = Password::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty_password(!required)
            .validate_with(|value: &String| require_text(required, value))
            .interact_on(&self.term)
            .map_err(map_dialoguer)?;
        Ok(answer.trim().to_string())
    }
}

/// Blank answers, whitespace included, are refused for required prompts.
fn require_text(required: bool, value: &str) -> Result<(), &'static str> {
    if required && value.trim().is_empty() {
        Err("a value is required")
    } else {
        Ok(())
    }
}

fn map_dialoguer(error: dialoguer::Error) -> PromptError {
    match error {
        dialoguer::Error::IO(err) => err.into(),
        #[allow(unreachable_patterns)]
        other => PromptError::Io(other.to_string()),
    }
}
