//! Host authentication for GitHub.com and GitHub Enterprise.
//!
//! Establishes, verifies and persists an access token for a named host,
//! either from a token piped on standard input or by walking the operator
//! through an interactive login.
//!
//! # Quick Start
//!
//! ```no_run
//! use hubauth::api::ApiClientFactory;
//! use hubauth::auth::DeviceCodeFlow;
//! use hubauth::config::FileHostsStore;
//! use hubauth::login::{FlowInput, LoginFlow, TerminalReporter, TtyState, REQUIRED_SCOPES};
//! use hubauth::prompt::TerminalPrompter;
//!
//! # async fn example() -> hubauth::error::Result<()> {
//! let store = FileHostsStore::open("/tmp/hubauth/hosts.toml")?;
//! let clients = ApiClientFactory::default();
//! let browser = DeviceCodeFlow::new("client-id", &REQUIRED_SCOPES);
//! let prompter = TerminalPrompter::new();
//! let mut reporter = TerminalReporter::stderr();
//!
//! let input = FlowInput {
//!     token: Some("ghp_example".to_string()),
//!     tty: TtyState::default(),
//!     with_token: true,
//!     ..FlowInput::default()
//! };
//! LoginFlow::new(&store, &clients, &prompter, &browser, &mut reporter)
//!     .run(input)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod login;
pub mod prompt;

#[cfg(feature = "cli")]
pub mod cli;
