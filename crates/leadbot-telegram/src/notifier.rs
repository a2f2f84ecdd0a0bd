//! New-lead notifications to the operator chat.

use std::sync::Arc;

use leadbot_models::Lead;
use serde::Serialize;
use tracing::{info, warn};

use crate::card::CardRenderer;
use crate::client::TelegramClient;
use crate::error::{Result, TransportError};
use crate::transport::InlineKeyboard;

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    reply_markup: &'a InlineKeyboard,
}

/// Posts a card for every newly created lead.
///
/// Never mutates the lead; a failed send leaves the persisted lead as is.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Arc<TelegramClient>,
    chat_id: Option<i64>,
    renderer: CardRenderer,
}

impl Notifier {
    pub fn new(client: Arc<TelegramClient>, chat_id: Option<i64>, renderer: CardRenderer) -> Self {
        Self {
            client,
            chat_id,
            renderer,
        }
    }

    /// Sends the lead card with its initial controls.
    ///
    /// Configuration problems (token, chat id) surface as errors for which
    /// [`TransportError::is_configuration`] holds; a non-success answer from
    /// the Bot API surfaces as [`TransportError::Rejected`] with the body.
    pub async fn notify(&self, lead: &Lead) -> Result<()> {
        let chat_id = self.chat_id.ok_or(TransportError::MissingChatId)?;
        let url = self.client.method_url("sendMessage").await?;
        let card = self.renderer.render(lead);

        let body = SendMessageBody {
            chat_id,
            text: &card.text,
            parse_mode: "HTML",
            reply_markup: &card.keyboard,
        };
        let response = self.client.http().post(url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(lead_id = %lead.id, status = status.as_u16(), "Bot API rejected lead notification");
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(lead_id = %lead.id, chat_id, "Lead notification sent");
        Ok(())
    }
}
