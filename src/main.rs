//! hubauth CLI binary entry point.

use hubauth::cli::errors::format_login_error;
use hubauth::cli::{AuthCommands, Cli, Commands};
use hubauth::config::AppConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse_args();
    let config = AppConfig::from_env();
    init_tracing();

    let result = match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => hubauth::cli::auth::handle_login(&args, &config).await,
        },
    };

    if let Err(e) = result {
        let color = dialoguer::console::colors_enabled_stderr();
        eprintln!("{}", format_login_error(&e, color));
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HUBAUTH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
