//! Leadbot entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use leadbot::cli::{Cli, Commands};
use leadbot::commands;

#[tokio::main]
async fn main() {
    // .env.local wins over .env; already-set variables win over both.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    fmt().with_env_filter(filter).with_target(false).init();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve(&cli.options).await,
        Commands::Poll => commands::poll(&cli.options).await,
        Commands::EncryptToken { token, out } => {
            commands::encrypt_token_to_file(token.as_deref(), cli.options.passphrase.as_deref(), &out)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
