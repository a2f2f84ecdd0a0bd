//! Bot lifecycle: identity lookup, webhook registration, and long polling.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use url::Url;

use crate::client::TelegramClient;
use crate::error::Result;
use crate::event::InboundEvent;
use crate::handlers::Command;
use crate::router::LeadRouter;

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Looks up the bot's username. Failures are logged and yield `None`.
pub async fn fetch_username(client: &TelegramClient) -> Option<String> {
    let bot = match client.bot().await {
        Ok(bot) => bot,
        Err(e) => {
            warn!(error = %e, "Bot token unavailable, skipping getMe");
            return None;
        }
    };
    match bot.get_me().await {
        Ok(me) => {
            let username = me.username().to_string();
            info!(username = %username, "Bot identity resolved");
            Some(username)
        }
        Err(e) => {
            warn!(error = %e, "getMe failed, commands parse without bot name");
            None
        }
    }
}

/// Publishes the command list shown in Telegram clients.
pub async fn publish_commands(client: &TelegramClient) -> Result<()> {
    let bot = client.bot().await?;
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

/// Points Telegram at the public webhook URL.
pub async fn register_webhook(client: &TelegramClient, url: &Url, secret: Option<&str>) -> Result<()> {
    let bot = client.bot().await?;
    let mut request = bot.set_webhook(url.clone());
    if let Some(secret) = secret {
        request = request.secret_token(secret.to_string());
    }
    request.await?;
    info!(url = %url, "Webhook registered");
    Ok(())
}

/// Runs long polling until Ctrl-C, feeding every update to the router.
///
/// Any webhook is removed first; Telegram refuses `getUpdates` while one is set.
pub async fn run_polling(client: &TelegramClient, router: Arc<LeadRouter>) -> Result<()> {
    let bot = client.bot().await?;
    bot.delete_webhook().await?;

    let handler = dptree::entry().endpoint(move |update: Update| {
        let router = Arc::clone(&router);
        async move {
            if let Some(event) = InboundEvent::from_update(&update) {
                router.handle(event).await;
            }
            respond(())
        }
    });

    info!("Bot is running in polling mode");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
