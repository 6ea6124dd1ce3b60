//! The host login flow.
//!
//! [`LoginFlow::run`] decides once, from flags and terminal state, whether
//! the token arrives on standard input or is collected interactively, then
//! persists it, verifies its scopes and records the git protocol.
//!
//! ```text
//! START → validate-tty → choose-host → choose-auth-method
//!   browser → external-oauth-flow → (FAIL) → choose-protocol
//!   token   → prompt-token → persist+commit → verify-scopes → (FAIL) → choose-protocol
//! choose-protocol → persist+commit → lookup-identity → (FAIL) / SUCCESS
//! ```
//!
//! Every failure is returned immediately; nothing is retried and nothing
//! already committed is rolled back.

pub mod report;

pub use report::{LoginEvent, LoginReporter, TerminalReporter};

use std::fmt;
use std::io::IsTerminal;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

use crate::api::{ApiClientFactory, DEFAULT_HOSTNAME};
use crate::auth::BrowserAuth;
use crate::config::{CredentialStore, GIT_PROTOCOL_KEY, OAUTH_TOKEN_KEY};
use crate::error::{LoginError, UsageError};
use crate::prompt::Prompter;

/// Scopes a token must carry; order is irrelevant.
pub const REQUIRED_SCOPES: [&str; 2] = ["repo", "read:org"];

/// Whether the standard streams are attached to a terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtyState {
    pub stdin: bool,
    pub stdout: bool,
}

impl TtyState {
    pub fn detect() -> Self {
        Self {
            stdin: std::io::stdin().is_terminal(),
            stdout: std::io::stdout().is_terminal(),
        }
    }

    pub fn interactive() -> Self {
        Self {
            stdin: true,
            stdout: true,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.stdin && self.stdout
    }
}

/// Inputs of one login invocation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FlowInput {
    /// Empty or `None` means "ask" (interactive) or "github.com" (token).
    pub hostname: Option<String>,
    /// Token read from standard input; only honored with `with_token`.
    pub token: Option<String>,
    pub tty: TtyState,
    pub with_token: bool,
}

impl fmt::Debug for FlowInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowInput")
            .field("hostname", &self.hostname)
            .field("token", &self.token.as_ref().map(|_| ".."))
            .field("tty", &self.tty)
            .field("with_token", &self.with_token)
            .finish()
    }
}

impl FlowInput {
    /// Reject flag/terminal combinations before anything is read or written.
    pub fn check_token_source(stdin_tty: bool, with_token: bool) -> Result<(), UsageError> {
        match (stdin_tty, with_token) {
            (false, false) => Err(UsageError::TokenSourceRequired),
            (true, true) => Err(UsageError::AmbiguousTokenSource),
            _ => Ok(()),
        }
    }
}

/// Which branch an invocation takes, computed once at entry.
#[derive(Clone, PartialEq, Eq)]
pub enum FlowMode {
    NonInteractive { hostname: String, token: String },
    Interactive { hostname: Option<String> },
}

impl fmt::Debug for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonInteractive { hostname, .. } => f
                .debug_struct("NonInteractive")
                .field("hostname", hostname)
                .finish_non_exhaustive(),
            Self::Interactive { hostname } => f
                .debug_struct("Interactive")
                .field("hostname", hostname)
                .finish(),
        }
    }
}

impl FlowMode {
    pub fn from_input(input: FlowInput) -> Result<Self, UsageError> {
        FlowInput::check_token_source(input.tty.stdin, input.with_token)?;
        let hostname = input
            .hostname
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty());

        if input.with_token {
            return Ok(Self::NonInteractive {
                hostname: hostname.unwrap_or_else(|| DEFAULT_HOSTNAME.to_string()),
                token: input.token.unwrap_or_default(),
            });
        }
        if !input.tty.is_interactive() {
            return Err(UsageError::InteractiveTerminalRequired);
        }
        Ok(Self::Interactive { hostname })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NonInteractive { .. } => "non-interactive",
            Self::Interactive { .. } => "interactive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum HostKind {
    Public,
    Enterprise,
}

impl HostKind {
    fn label(self) -> &'static str {
        match self {
            Self::Public => "GitHub.com",
            Self::Enterprise => "GitHub Enterprise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum AuthMethod {
    Browser,
    PasteToken,
}

impl AuthMethod {
    fn label(self) -> &'static str {
        match self {
            Self::Browser => "Login with a web browser",
            Self::PasteToken => "Paste an authentication token",
        }
    }
}

/// Transport used for git operations against a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, AsRefStr, strum::Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GitProtocol {
    Https,
    Ssh,
}

impl GitProtocol {
    pub fn label(self) -> &'static str {
        match self {
            Self::Https => "HTTPS",
            Self::Ssh => "SSH",
        }
    }
}

/// Drives one login invocation against injected collaborators.
pub struct LoginFlow<'a> {
    store: &'a dyn CredentialStore,
    clients: &'a ApiClientFactory,
    prompter: &'a dyn Prompter,
    browser: &'a dyn BrowserAuth,
    reporter: &'a mut dyn LoginReporter,
}

impl<'a> LoginFlow<'a> {
    pub fn new(
        store: &'a dyn CredentialStore,
        clients: &'a ApiClientFactory,
        prompter: &'a dyn Prompter,
        browser: &'a dyn BrowserAuth,
        reporter: &'a mut dyn LoginReporter,
    ) -> Self {
        Self {
            store,
            clients,
            prompter,
            browser,
            reporter,
        }
    }

    pub async fn run(&mut self, input: FlowInput) -> Result<(), LoginError> {
        let mode = FlowMode::from_input(input)?;
        tracing::debug!(mode = mode.name(), "starting login flow");
        match mode {
            FlowMode::NonInteractive { hostname, token } => {
                self.run_with_token(&hostname, &token).await
            }
            FlowMode::Interactive { hostname } => self.run_interactive(hostname).await,
        }
    }

    async fn run_with_token(&mut self, hostname: &str, token: &str) -> Result<(), LoginError> {
        self.store_token(hostname, token)?;
        self.verify_scopes(hostname, false).await
    }

    async fn run_interactive(&mut self, hostname: Option<String>) -> Result<(), LoginError> {
        let hostname = match hostname {
            Some(hostname) => hostname,
            None => self.choose_host()?,
        };
        self.reporter.report(&LoginEvent::LoggingInto {
            hostname: hostname.clone(),
        });

        match self.choose::<AuthMethod>("How would you like to authenticate?", AuthMethod::label)? {
            AuthMethod::Browser => {
                self.browser
                    .authenticate(self.store, &hostname)
                    .await
                    .map_err(LoginError::AuthFlow)?;
            }
            AuthMethod::PasteToken => {
                self.reporter.report(&LoginEvent::TokenHint {
                    hostname: hostname.clone(),
                    scopes: required_scopes(),
                });
                let token = self
                    .prompter
                    .password("Paste your authentication token:", true)?;
                self.store_token(&hostname, &token)?;
                self.verify_scopes(&hostname, true).await?;
            }
        }

        let protocol = self.choose::<GitProtocol>("Choose default git protocol", GitProtocol::label)?;
        self.reporter.report(&LoginEvent::SettingProtocol {
            hostname: hostname.clone(),
            protocol,
        });
        self.store.set(&hostname, GIT_PROTOCOL_KEY, protocol.as_ref())?;
        self.store.commit()?;
        self.reporter.report(&LoginEvent::ProtocolConfigured {
            hostname: hostname.clone(),
            protocol,
        });

        let client = self
            .clients
            .build(self.store, &hostname)
            .map_err(LoginError::Client)?;
        let login = client
            .current_login()
            .await
            .map_err(LoginError::IdentityLookup)?;
        tracing::debug!(%hostname, %login, "login flow complete");
        self.reporter.report(&LoginEvent::LoggedIn { hostname, login });
        Ok(())
    }

    fn choose_host(&mut self) -> Result<String, LoginError> {
        match self.choose::<HostKind>("What account do you want to log into?", HostKind::label)? {
            HostKind::Public => Ok(DEFAULT_HOSTNAME.to_string()),
            HostKind::Enterprise => Ok(self.prompter.input("GHE hostname:", true)?),
        }
    }

    fn choose<T: IntoEnumIterator + Copy>(
        &mut self,
        message: &str,
        label: fn(T) -> &'static str,
    ) -> Result<T, LoginError> {
        let choices: Vec<T> = T::iter().collect();
        let labels: Vec<&str> = choices.iter().map(|c| label(*c)).collect();
        let index = self.prompter.select(message, &labels)?;
        choices
            .get(index)
            .copied()
            .ok_or_else(|| LoginError::Prompt(format!("selection {index} out of range")))
    }

    /// Stage and commit the token; it must be durable before a client can use it.
    fn store_token(&mut self, hostname: &str, token: &str) -> Result<(), LoginError> {
        self.store.set(hostname, OAUTH_TOKEN_KEY, token)?;
        self.store.commit()?;
        tracing::debug!(%hostname, "token committed");
        Ok(())
    }

    async fn verify_scopes(&mut self, hostname: &str, interactive: bool) -> Result<(), LoginError> {
        let client = self
            .clients
            .build(self.store, hostname)
            .map_err(LoginError::Client)?;
        let check = client
            .has_scopes(&REQUIRED_SCOPES)
            .await
            .map_err(LoginError::Verification)?;
        if !check.satisfied {
            tracing::warn!(%hostname, granted = ?check.granted, "token lacks required scopes");
            return Err(LoginError::InsufficientScope {
                required: required_scopes(),
                interactive,
            });
        }
        Ok(())
    }
}

fn required_scopes() -> Vec<String> {
    REQUIRED_SCOPES.iter().map(|s| s.to_string()).collect()
}
