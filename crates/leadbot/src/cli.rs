//! Command-line interface definition using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use leadbot_telegram::config::{normalize_api_url, DEFAULT_API_URL};
use leadbot_telegram::{CredentialSource, TelegramConfig};
use secrecy::SecretString;
use url::Url;

/// Leadbot - landing-page leads delivered to a Telegram operator chat
#[derive(Parser, Debug)]
#[command(name = "leadbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub options: ServiceOptions,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server: lead submissions and the Telegram webhook (default)
    Serve,

    /// Run the bot with long polling instead of a webhook
    Poll,

    /// Encrypt a bot token for ENCRYPTED_TG_TOKEN or the token file
    EncryptToken {
        /// Plaintext bot token
        #[arg(env = "TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Output file
        #[arg(default_value = "encrypted.token")]
        out: PathBuf,
    },
}

/// Options shared by every run mode. Empty values count as unset.
#[derive(Args, Debug, Clone)]
pub struct ServiceOptions {
    /// Host to bind the HTTP server to
    #[arg(long, env = "LEADBOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory of the JSON lead store
    #[arg(long, env = "LEADBOT_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Keep leads in memory only
    #[arg(long)]
    pub memory: bool,

    /// Plaintext bot token
    #[arg(long, env = "TG_BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Encrypted bot token (IV:TAG:CIPHERTEXT)
    #[arg(long, env = "ENCRYPTED_TG_TOKEN", hide_env_values = true)]
    pub encrypted_token: Option<String>,

    /// Passphrase for the encrypted token
    #[arg(long, env = "ENCRYPT_PW", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// File holding the encrypted token
    #[arg(long, env = "TG_TOKEN_FILE", default_value = "my-app/encrypted.token")]
    pub token_file: PathBuf,

    /// Operator chat id for new-lead notifications
    #[arg(long, env = "TG_CHAT_ID", allow_hyphen_values = true)]
    pub chat_id: Option<String>,

    /// Bot API base URL
    #[arg(long, env = "TG_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Public webhook URL registered at startup
    #[arg(long, env = "TG_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Secret Telegram must echo on webhook calls
    #[arg(long, env = "TG_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: Option<String>,

    /// Hours east of UTC for card timestamps and daily stats
    #[arg(long, env = "LEADBOT_UTC_OFFSET", default_value_t = 3, allow_hyphen_values = true)]
    pub utc_offset: i32,

    /// Seconds a note prompt stays open
    #[arg(long, env = "LEADBOT_NOTE_TTL", default_value_t = 900)]
    pub note_ttl: u64,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ServiceOptions {
    /// Token sources in resolution order.
    pub fn credentials(&self) -> CredentialSource {
        CredentialSource {
            token: non_empty(&self.bot_token).map(SecretString::from),
            encrypted: non_empty(&self.encrypted_token),
            passphrase: non_empty(&self.passphrase).map(SecretString::from),
            token_file: Some(self.token_file.clone()),
        }
    }

    /// Builds the Telegram configuration, validating ids and URLs.
    pub fn telegram_config(&self) -> Result<TelegramConfig, String> {
        let chat_id = non_empty(&self.chat_id)
            .map(|raw| raw.parse::<i64>().map_err(|_| format!("TG_CHAT_ID is not an integer: {raw:?}")))
            .transpose()?;
        let api_url = normalize_api_url(&self.api_url).map_err(|e| format!("invalid TG_API_URL: {e}"))?;
        let webhook_url = non_empty(&self.webhook_url)
            .map(|raw| Url::parse(&raw).map_err(|e| format!("invalid TG_WEBHOOK_URL: {e}")))
            .transpose()?;

        Ok(TelegramConfig {
            credentials: self.credentials(),
            chat_id,
            api_url,
            utc_offset_hours: self.utc_offset,
            note_ttl: Duration::from_secs(self.note_ttl),
            webhook_url,
            webhook_secret: non_empty(&self.webhook_secret),
        })
    }
}

impl Cli {
    /// Tracing filter for the verbosity flag.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "leadbot=info,leadbot_api=info,leadbot_telegram=info,leadbot_persistence=info,teloxide=warn",
            1 => "leadbot=debug,leadbot_api=debug,leadbot_telegram=debug,leadbot_persistence=debug,tower_http=debug,teloxide=info",
            2 => "leadbot=trace,leadbot_api=trace,leadbot_telegram=trace,leadbot_persistence=trace,tower_http=trace,teloxide=debug",
            _ => "trace",
        }
    }
}
