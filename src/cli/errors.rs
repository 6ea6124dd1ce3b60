//! CLI-specific error formatting for user-facing messages.

use dialoguer::console::style;

use crate::error::LoginError;

/// Render a failed login as the single line printed on stderr.
pub fn format_login_error(err: &LoginError, color: bool) -> String {
    match err {
        LoginError::InsufficientScope {
            interactive: true, ..
        } => format!("{} {err}", style("!").red().force_styling(color)),
        err if err.is_post_success() => {
            format!("{} {err}", style("!").yellow().force_styling(color))
        }
        LoginError::Usage(_) => {
            format!("Error: {err}\n\nRun 'hubauth auth login --help' for usage.")
        }
        LoginError::PromptCancelled => "Login cancelled".to_string(),
        other => format!("Error: {other}"),
    }
}
