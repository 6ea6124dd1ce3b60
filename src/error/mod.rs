//! Error types for the login flow.

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::auth::AuthError;
use crate::config::StoreError;
use crate::prompt::PromptError;

/// Flag/terminal combinations that cannot produce a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("--with-token required when not attached to tty")]
    TokenSourceRequired,
    #[error("expected token on standard input, but it is a terminal")]
    AmbiguousTokenSource,
    #[error("token must be passed via standard input and --with-token when not attached to tty")]
    InteractiveTerminalRequired,
    #[error("failed to read token from standard input: {0}")]
    UnreadableToken(String),
}

/// Terminal outcome of a failed login flow.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not create API client: {0}")]
    Client(#[source] ApiError),

    #[error("could not verify token: {0}")]
    Verification(#[source] ApiError),

    #[error("token missing at least one of the required scopes: {}", ScopeList(.required))]
    InsufficientScope {
        required: Vec<String>,
        /// Raised from the interactive branch; rendered with a failure marker.
        interactive: bool,
    },

    #[error("failed to authenticate via web browser: {0}")]
    AuthFlow(#[source] AuthError),

    #[error("error using api: {0}")]
    IdentityLookup(#[source] ApiError),

    #[error("prompt cancelled")]
    PromptCancelled,

    #[error("could not prompt: {0}")]
    Prompt(String),
}

impl From<PromptError> for LoginError {
    fn from(error: PromptError) -> Self {
        match error {
            PromptError::Cancelled => Self::PromptCancelled,
            PromptError::Io(message) => Self::Prompt(message),
        }
    }
}

/// Broad classification used when rendering a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Storage,
    Network,
    Authorization,
    Cancelled,
    Terminal,
}

impl LoginError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Usage(_) => ErrorCategory::Usage,
            Self::Store(_) => ErrorCategory::Storage,
            Self::Client(_) | Self::Verification(_) | Self::IdentityLookup(_) => {
                ErrorCategory::Network
            }
            Self::InsufficientScope { .. } | Self::AuthFlow(_) => ErrorCategory::Authorization,
            Self::PromptCancelled => ErrorCategory::Cancelled,
            Self::Prompt(_) => ErrorCategory::Terminal,
        }
    }

    /// The credential and protocol are already committed; only the final
    /// identity confirmation failed.
    pub fn is_post_success(&self) -> bool {
        matches!(self, Self::IdentityLookup(_))
    }

    /// Whether `--help` would tell the operator how to fix this.
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

struct ScopeList<'a>(&'a [String]);

impl fmt::Display for ScopeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.0.iter().map(|s| format!("'{s}'")).collect();
        f.write_str(&quoted.join(", "))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LoginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_scope_lists_every_required_scope() {
        let err = LoginError::InsufficientScope {
            required: vec!["repo".into(), "read:org".into()],
            interactive: false,
        };
        assert_eq!(
            err.to_string(),
            "token missing at least one of the required scopes: 'repo', 'read:org'"
        );
        assert_eq!(err.category(), ErrorCategory::Authorization);
    }

    #[test]
    fn verification_wraps_cause() {
        let err = LoginError::Verification(ApiError::Status {
            status: 401,
            message: "Bad credentials".into(),
        });
        assert_eq!(err.to_string(), "could not verify token: HTTP 401: Bad credentials");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn prompt_errors_split_cancel_from_io() {
        assert!(matches!(
            LoginError::from(PromptError::Cancelled),
            LoginError::PromptCancelled
        ));
        assert!(matches!(
            LoginError::from(PromptError::Io("eof".into())),
            LoginError::Prompt(_)
        ));
    }

    #[test]
    fn only_identity_lookup_is_post_success() {
        let lookup = LoginError::IdentityLookup(ApiError::Network("reset".into()));
        assert!(lookup.is_post_success());
        assert!(!LoginError::PromptCancelled.is_post_success());
        assert!(LoginError::from(UsageError::TokenSourceRequired).is_usage());
    }
}
