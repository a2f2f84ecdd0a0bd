//! Telegram webhook intake.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use leadbot_telegram::bot::SECRET_TOKEN_HEADER;
use leadbot_telegram::InboundEvent;
use teloxide::types::Update;
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::types::WebhookAck;

/// POST /api/bot - Accept an update and process it in the background.
///
/// Answers `{"ok": true}` for any accepted body so Telegram does not redeliver
/// updates we cannot use.
pub async fn bot_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Result<Json<WebhookAck>> {
    if let Some(expected) = state.config.webhook_secret.as_deref() {
        let provided = headers.get(SECRET_TOKEN_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            warn!("Webhook call with missing or wrong secret");
            return Err(ApiError::Unauthorized);
        }
    }

    match serde_json::from_slice::<Update>(&body) {
        Ok(update) => match InboundEvent::from_update(&update) {
            Some(event) => {
                let router = state.router.clone();
                tokio::spawn(async move {
                    router.handle(event).await;
                });
            }
            None => debug!("Ignoring update without a handled kind"),
        },
        Err(e) => warn!(error = %e, "Webhook body is not a Telegram update"),
    }

    Ok(Json(WebhookAck { ok: true }))
}
