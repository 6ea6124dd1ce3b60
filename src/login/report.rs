use std::io::Write;

use dialoguer::console::style;

use super::GitProtocol;

/// Progress of a login flow, reported to the operator as it happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginEvent {
    LoggingInto { hostname: String },
    TokenHint { hostname: String, scopes: Vec<String> },
    SettingProtocol { hostname: String, protocol: GitProtocol },
    ProtocolConfigured { hostname: String, protocol: GitProtocol },
    LoggedIn { hostname: String, login: String },
}

pub trait LoginReporter {
    fn report(&mut self, event: &LoginEvent);
}

/// Renders events as status lines on a diagnostic stream.
pub struct TerminalReporter<W: Write> {
    out: W,
    color: bool,
}

impl TerminalReporter<std::io::Stderr> {
    pub fn stderr() -> Self {
        let color = dialoguer::console::colors_enabled_stderr();
        Self::new(std::io::stderr(), color)
    }
}

impl<W: Write> TerminalReporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&self, event: &LoginEvent) -> String {
        let check = style("✓").green().force_styling(self.color);
        match event {
            LoginEvent::LoggingInto { hostname } => format!("- Logging into {hostname}"),
            LoginEvent::TokenHint { hostname, scopes } => {
                let scopes: Vec<String> = scopes.iter().map(|s| format!("'{s}'")).collect();
                format!(
                    "\nTip: you can generate a Personal Access Token here https://{hostname}/settings/tokens\n\
                     The minimum required scopes are {}.",
                    scopes.join(" and ")
                )
            }
            LoginEvent::SettingProtocol { hostname, protocol } => {
                format!("- Setting git_protocol to {protocol} for {hostname}")
            }
            LoginEvent::ProtocolConfigured { .. } => format!("{check} Configured git protocol"),
            LoginEvent::LoggedIn { login, .. } => format!(
                "{check} Logged in as {}",
                style(login).bold().force_styling(self.color)
            ),
        }
    }
}

impl<W: Write> LoginReporter for TerminalReporter<W> {
    fn report(&mut self, event: &LoginEvent) {
        let line = self.render(event);
        // Write failures on the diagnostic stream are ignored.
        let _ = writeln!(self.out, "{line}");
    }
}
