//! HTTP surface of the lead CRM.
//!
//! - `POST /api/leads` (and the legacy `POST /api/sendOrder`): store a booking
//!   request and announce it in the operator chat
//! - `POST /api/bot`: Telegram webhook
//! - `GET /api/health`, `GET /api/bot`: liveness
//!
//! # Example
//!
//! ```ignore
//! use leadbot_api::{ApiConfig, AppState, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(/* ... */);
//!     serve(ApiConfig::default(), state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use leadbot_persistence::MemoryLeadStore;
    use leadbot_telegram::config::normalize_api_url;
    use leadbot_telegram::{CardRenderer, CredentialSource, LeadRouter, Notifier, TelegramClient, TelegramTransport};

    use crate::config::ApiConfig;
    use crate::state::AppState;

    pub fn make_test_state(api_url: &str, chat_id: Option<i64>) -> AppState {
        make_test_state_with(api_url, chat_id, Some("TEST:TOKEN"), None)
    }

    pub fn make_test_state_with(
        api_url: &str,
        chat_id: Option<i64>,
        token: Option<&str>,
        secret: Option<&str>,
    ) -> AppState {
        let credentials = token.map(|t| CredentialSource::plain(t)).unwrap_or_default();
        let client = Arc::new(TelegramClient::new(credentials, normalize_api_url(api_url).unwrap()));
        let store = Arc::new(MemoryLeadStore::new());
        let renderer = CardRenderer::default();

        let router = LeadRouter::new(
            store.clone(),
            Arc::new(TelegramTransport::new(client.clone())),
            renderer,
            Duration::from_secs(900),
        );
        let config = ApiConfig::new("127.0.0.1", 0).with_webhook_secret(secret.map(str::to_string));

        AppState::new(config, store, Notifier::new(client, chat_id, renderer), Arc::new(router))
    }
}
