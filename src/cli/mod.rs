//! CLI entry point for hubauth.

pub mod auth;
pub mod errors;

use clap::{Parser, Subcommand};

/// hubauth CLI
#[derive(Parser, Debug)]
#[command(name = "hubauth", version, about = "Authenticate with GitHub hosts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Authenticate with a GitHub host
    #[command(
        long_about = "Authenticate with a GitHub host.\n\n\
            This interactive command initializes your authentication state either by helping \
            you log into GitHub via browser-based OAuth or by accepting a Personal Access Token.\n\n\
            The interactivity can be avoided by specifying --with-token and passing a token on \
            standard input.",
        after_help = "Examples:\n  \
            $ hubauth auth login\n  \
            # => do an interactive setup\n\n  \
            $ hubauth auth login --with-token < mytoken.txt\n  \
            # => read token from mytoken.txt and authenticate against github.com\n\n  \
            $ hubauth auth login --hostname enterprise.internal --with-token < mytoken.txt\n  \
            # => read token from mytoken.txt and authenticate against a GitHub Enterprise instance"
    )]
    Login(LoginArgs),
}

/// Arguments for `hubauth auth login`.
#[derive(Parser, Debug, Clone, Default)]
pub struct LoginArgs {
    /// The hostname of the GitHub instance to authenticate with
    #[arg(long)]
    pub hostname: Option<String>,

    /// Read the token from standard input
    #[arg(long)]
    pub with_token: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
