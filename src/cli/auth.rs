//! CLI auth command handlers.

use std::io::Read;

use super::LoginArgs;
use crate::api::ApiClientFactory;
use crate::auth::DeviceCodeFlow;
use crate::config::{AppConfig, FileHostsStore};
use crate::error::{LoginError, UsageError};
use crate::login::{FlowInput, LoginFlow, TerminalReporter, TtyState, REQUIRED_SCOPES};
use crate::prompt::TerminalPrompter;

/// Handle `hubauth auth login`.
pub async fn handle_login(args: &LoginArgs, config: &AppConfig) -> Result<(), LoginError> {
    let input = flow_input(args, TtyState::detect(), std::io::stdin().lock())?;

    let store = FileHostsStore::open(config.hosts_path())?;
    let mut clients = ApiClientFactory::new().map_err(LoginError::Client)?;
    if let Some(url) = &config.api_url {
        clients = clients.with_api_url(url.clone());
    }
    let browser = DeviceCodeFlow::new(config.oauth_client_id.clone(), &REQUIRED_SCOPES)
        .with_http(clients.http().clone());
    let prompter = TerminalPrompter::new();
    let mut reporter = TerminalReporter::stderr();

    LoginFlow::new(&store, &clients, &prompter, &browser, &mut reporter)
        .run(input)
        .await
}

/// Build the flow input, reading `stdin` to completion only when the flags
/// and terminal state make it the token source.
pub fn flow_input(
    args: &LoginArgs,
    tty: TtyState,
    mut stdin: impl Read,
) -> Result<FlowInput, LoginError> {
    FlowInput::check_token_source(tty.stdin, args.with_token)?;

    let token = if args.with_token {
        let mut raw = Vec::new();
        stdin
            .read_to_end(&mut raw)
            .map_err(|err| UsageError::UnreadableToken(err.to_string()))?;
        let text =
            String::from_utf8(raw).map_err(|err| UsageError::UnreadableToken(err.to_string()))?;
        Some(text.trim().to_string())
    } else {
        None
    };

    Ok(FlowInput {
        hostname: args.hostname.clone(),
        token,
        tty,
        with_token: args.with_token,
    })
}
