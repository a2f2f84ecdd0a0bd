//! Run modes and one-shot commands.

use std::path::Path;
use std::sync::Arc;

use leadbot_api::{serve as serve_api, ApiConfig, AppState};
use leadbot_persistence::{JsonLeadStore, LeadStore, MemoryLeadStore};
use leadbot_telegram::bot::{fetch_username, publish_commands, register_webhook, run_polling};
use leadbot_telegram::{
    encrypt_token, CardRenderer, LeadRouter, Notifier, TelegramClient, TelegramConfig, TelegramTransport,
};
use tracing::{info, warn};

use crate::cli::ServiceOptions;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Everything a run mode needs, wired once. The client owns the credentials.
pub struct Services {
    pub telegram: TelegramConfig,
    pub client: Arc<TelegramClient>,
    pub store: Arc<dyn LeadStore>,
    pub renderer: CardRenderer,
}

impl Services {
    pub fn build(options: &ServiceOptions) -> Result<Self> {
        let mut telegram = options.telegram_config()?;
        let store: Arc<dyn LeadStore> = if options.memory {
            info!("Using in-memory lead store");
            Arc::new(MemoryLeadStore::new())
        } else {
            let store = JsonLeadStore::open(&options.data_dir)?;
            info!(path = %store.path().display(), "Using JSON lead store");
            Arc::new(store)
        };
        let credentials = std::mem::take(&mut telegram.credentials);
        let client = Arc::new(TelegramClient::new(credentials, telegram.api_url.clone()));
        let renderer = CardRenderer::with_utc_offset_hours(telegram.utc_offset_hours);

        if telegram.chat_id.is_none() {
            warn!("TG_CHAT_ID is not set; new leads will be stored without notification");
        }

        Ok(Self {
            telegram,
            client,
            store,
            renderer,
        })
    }

    /// Router wired to the live Bot API. The username is looked up once.
    pub async fn router(&self) -> LeadRouter {
        let transport = Arc::new(TelegramTransport::new(self.client.clone()));
        LeadRouter::new(self.store.clone(), transport, self.renderer, self.telegram.note_ttl)
            .with_bot_username(fetch_username(&self.client).await)
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.client.clone(), self.telegram.chat_id, self.renderer)
    }
}

/// HTTP mode: lead intake plus the webhook endpoint.
pub async fn serve(options: &ServiceOptions) -> Result<()> {
    let services = Services::build(options)?;

    match services.client.token().await {
        Ok(_) => {
            if let Err(e) = publish_commands(&services.client).await {
                warn!(error = %e, "Failed to publish bot commands");
            }
            if let Some(url) = &services.telegram.webhook_url {
                if let Err(e) =
                    register_webhook(&services.client, url, services.telegram.webhook_secret.as_deref()).await
                {
                    warn!(error = %e, "Failed to register webhook");
                }
            }
        }
        Err(e) => warn!(error = %e, "Bot token unavailable; notifications will fail until it is configured"),
    }

    let router = Arc::new(services.router().await);
    let config = ApiConfig::new(options.host.clone(), options.port)
        .with_webhook_secret(services.telegram.webhook_secret.clone());
    let state = AppState::new(config.clone(), services.store.clone(), services.notifier(), router);

    serve_api(config, state).await?;
    Ok(())
}

/// Long-polling mode for development without a public URL.
pub async fn poll(options: &ServiceOptions) -> Result<()> {
    let services = Services::build(options)?;
    services.client.token().await?;

    if let Err(e) = publish_commands(&services.client).await {
        warn!(error = %e, "Failed to publish bot commands");
    }
    let router = Arc::new(services.router().await);
    run_polling(&services.client, router).await?;
    Ok(())
}

/// Writes the encrypted form of `token` to `out`.
pub fn encrypt_token_to_file(token: Option<&str>, passphrase: Option<&str>, out: &Path) -> Result<()> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("TOKEN is required (argument or environment)")?;
    let passphrase = passphrase
        .filter(|p| !p.is_empty())
        .ok_or("ENCRYPT_PW is required to encrypt a token")?;

    let encrypted = encrypt_token(token, passphrase)?;
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out, encrypted)?;
    println!("Encrypted token written to {}", out.display());
    Ok(())
}
