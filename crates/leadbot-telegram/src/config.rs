//! Telegram-side configuration.

use std::time::Duration;

use url::Url;

use crate::credential::CredentialSource;
use crate::notes::DEFAULT_NOTE_TTL;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org/";

/// Hours east of UTC used for card timestamps and "today" in statistics.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 3;

#[derive(Debug)]
pub struct TelegramConfig {
    pub credentials: CredentialSource,
    /// Operator chat that receives new-lead notifications.
    pub chat_id: Option<i64>,
    /// Bot API base URL, always ending in `/`.
    pub api_url: Url,
    pub utc_offset_hours: i32,
    pub note_ttl: Duration,
    pub webhook_url: Option<Url>,
    pub webhook_secret: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialSource::default(),
            chat_id: None,
            api_url: default_api_url(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            note_ttl: DEFAULT_NOTE_TTL,
            webhook_url: None,
            webhook_secret: None,
        }
    }
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

/// Parses a Bot API base URL, adding the trailing slash method paths rely on.
pub fn normalize_api_url(raw: &str) -> Result<Url, url::ParseError> {
    let trimmed = raw.trim().trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
}
