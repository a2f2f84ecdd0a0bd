//! Bot API access with a lazily resolved token.
//!
//! The token is resolved on first use rather than at startup, so the HTTP
//! surface keeps serving while credentials are missing or broken; every
//! outbound call then fails with a configuration error.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::{
    ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, MessageId, ParseMode,
};
use tokio::sync::OnceCell;
use url::Url;

use crate::credential::CredentialSource;
use crate::error::{CredentialError, Result};
use crate::transport::{ChatTransport, InlineKeyboard, MessageRef, ReplyMarkup};

/// Shared Bot API handle.
pub struct TelegramClient {
    credentials: CredentialSource,
    api_url: Url,
    http: reqwest::Client,
    token: OnceCell<SecretString>,
    bot: OnceCell<Bot>,
}

impl TelegramClient {
    /// `api_url` must end in `/`; see [`crate::config::normalize_api_url`].
    pub fn new(credentials: CredentialSource, api_url: Url) -> Self {
        Self {
            credentials,
            api_url,
            http: reqwest::Client::new(),
            token: OnceCell::new(),
            bot: OnceCell::new(),
        }
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolves the token once; failures are retried on the next call.
    pub async fn token(&self) -> std::result::Result<&SecretString, CredentialError> {
        self.token.get_or_try_init(|| self.credentials.resolve()).await
    }

    /// teloxide bot bound to the configured API URL.
    pub async fn bot(&self) -> Result<Bot> {
        let bot = self
            .bot
            .get_or_try_init(|| async {
                let token = self.token().await?;
                Ok::<_, CredentialError>(Bot::new(token.expose_secret()).set_api_url(self.api_url.clone()))
            })
            .await?;
        Ok(bot.clone())
    }

    /// Full URL of a Bot API method. Contains the token; never log it.
    pub async fn method_url(&self, method: &str) -> Result<String> {
        let token = self.token().await?;
        Ok(format!("{}bot{}/{}", self.api_url.as_str(), token.expose_secret(), method))
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url.as_str())
            .field("token_resolved", &self.token.initialized())
            .finish()
    }
}

fn inline_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.text.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn reply_markup(markup: ReplyMarkup) -> teloxide::types::ReplyMarkup {
    match markup {
        ReplyMarkup::Inline(keyboard) => teloxide::types::ReplyMarkup::InlineKeyboard(inline_markup(&keyboard)),
        ReplyMarkup::Menu(rows) => teloxide::types::ReplyMarkup::Keyboard(KeyboardMarkup::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>()),
        )),
        ReplyMarkup::ForceReply => teloxide::types::ReplyMarkup::ForceReply(ForceReply::new()),
    }
}

/// [`ChatTransport`] backed by teloxide.
#[derive(Debug, Clone)]
pub struct TelegramTransport {
    client: Arc<TelegramClient>,
}

impl TelegramTransport {
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<MessageRef> {
        let bot = self.client.bot().await?;
        let mut request = bot.send_message(ChatId(chat_id), text).parse_mode(ParseMode::Html);
        if let Some(markup) = markup {
            request = request.reply_markup(reply_markup(markup));
        }
        let sent = request.await?;
        Ok(MessageRef {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn edit_message(&self, message: MessageRef, text: &str, keyboard: &InlineKeyboard) -> Result<()> {
        let bot = self.client.bot().await?;
        bot.edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text)
            .parse_mode(ParseMode::Html)
            .reply_markup(inline_markup(keyboard))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<()> {
        let bot = self.client.bot().await?;
        bot.delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str) -> Result<()> {
        let bot = self.client.bot().await?;
        bot.answer_callback_query(query_id.to_string()).await?;
        Ok(())
    }
}
