//! Inbound event dispatch.
//!
//! Text messages are tried in order: `/` command, menu label, note capture.
//! Anything else is ordinary chat and ignored. Button presses are acknowledged
//! first and then decoded into a [`LeadAction`].
//!
//! Every event is handled to completion without returning an error: store
//! failures are reported to the chat, transport failures are logged, and
//! malformed payloads are dropped.

use std::sync::Arc;
use std::time::Duration;

use leadbot_models::LeadId;
use leadbot_persistence::{LeadStore, StoreError};
use teloxide::utils::command::BotCommands;
use tracing::{debug, error, warn};

use crate::callback::LeadAction;
use crate::card::CardRenderer;
use crate::error::WorkflowError;
use crate::event::{InboundEvent, IncomingCallback, IncomingMessage};
use crate::handlers::{handle_command, handle_menu, Command};
use crate::menu::{MenuItem, UNKNOWN_COMMAND_TEXT};
use crate::notes::{extract_lead_id, is_note_prompt, prompt_text, OperatorKey, PendingNotes};
use crate::transport::{ChatTransport, MessageRef, ReplyMarkup};
use crate::workflow::Workflow;

/// Shown when the store fails for reasons other than a missing lead.
pub const STORE_ERROR_TEXT: &str = "❌ Ошибка базы данных, попробуйте позже";

pub fn lead_not_found_text(id: LeadId) -> String {
    format!("❌ Заявка #{id} не найдена")
}

/// Routes chat events to command handlers and the workflow.
pub struct LeadRouter {
    workflow: Workflow,
    pending: PendingNotes,
    bot_username: Option<String>,
}

impl LeadRouter {
    pub fn new(
        store: Arc<dyn LeadStore>,
        transport: Arc<dyn ChatTransport>,
        renderer: CardRenderer,
        note_ttl: Duration,
    ) -> Self {
        Self {
            workflow: Workflow::new(store, transport, renderer),
            pending: PendingNotes::new(note_ttl),
            bot_username: None,
        }
    }

    /// Username used to accept `/cmd@username` in group chats.
    pub fn with_bot_username(mut self, username: Option<String>) -> Self {
        self.bot_username = username;
        self
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn pending_notes(&self) -> &PendingNotes {
        &self.pending
    }

    fn transport(&self) -> &Arc<dyn ChatTransport> {
        self.workflow.transport()
    }

    pub async fn handle(&self, event: InboundEvent) {
        match event {
            InboundEvent::Message(message) => self.handle_message(message).await,
            InboundEvent::Callback(callback) => self.handle_callback(callback).await,
        }
    }

    async fn handle_message(&self, message: IncomingMessage) {
        let chat_id = message.chat_id;
        let result = if message.text.trim_start().starts_with('/') {
            self.dispatch_command(&message).await
        } else if let Some(item) = MenuItem::from_label(&message.text) {
            handle_menu(&self.workflow, chat_id, item).await
        } else {
            self.capture_note(&message).await
        };

        if let Err(e) = result {
            self.report(Some(chat_id), &e).await;
        }
    }

    async fn dispatch_command(&self, message: &IncomingMessage) -> Result<(), WorkflowError> {
        let username = self.bot_username.as_deref().unwrap_or_default();
        match Command::parse(message.text.trim(), username) {
            Ok(command) => handle_command(&self.workflow, message.chat_id, command).await,
            Err(e) => {
                debug!(chat_id = message.chat_id, error = %e, "Unrecognized command");
                self.transport()
                    .send_message(message.chat_id, UNKNOWN_COMMAND_TEXT, None)
                    .await?;
                Ok(())
            }
        }
    }

    /// Binds free text to a lead awaiting a note.
    ///
    /// A reply to a note prompt wins over the pending map. A reply to a prompt
    /// without a recognizable id is dropped. Either way the operator's pending
    /// entry is consumed.
    async fn capture_note(&self, message: &IncomingMessage) -> Result<(), WorkflowError> {
        let key = message.sender_id.map(|user_id| OperatorKey {
            chat_id: message.chat_id,
            user_id,
        });

        let target = match message.reply_to_text.as_deref().filter(|t| is_note_prompt(t)) {
            Some(prompt) => {
                if let Some(key) = key {
                    self.pending.forget(key).await;
                }
                let id = extract_lead_id(prompt);
                if id.is_none() {
                    debug!(chat_id = message.chat_id, "Note prompt reply without lead id");
                }
                id
            }
            None => match key {
                Some(key) => self.pending.take(key).await,
                None => None,
            },
        };

        let Some(id) = target else {
            return Ok(());
        };
        let text = message.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        self.workflow.save_note(message.chat_id, id, text).await?;
        Ok(())
    }

    async fn handle_callback(&self, callback: IncomingCallback) {
        // Acknowledge before any business logic; the outcome must not depend on it.
        if let Err(e) = self.transport().answer_callback(&callback.query_id).await {
            debug!(query_id = %callback.query_id, error = %e, "Callback acknowledgement failed");
        }

        let Some(data) = callback.data.as_deref() else {
            debug!(query_id = %callback.query_id, "Callback without data");
            return;
        };
        let action = match LeadAction::decode(data) {
            Ok(action) => action,
            Err(e) => {
                debug!(data, error = %e, "Ignoring malformed callback payload");
                return;
            }
        };

        let origin = callback.message;
        let result = match action {
            LeadAction::SetStatus { id, status } => self
                .workflow
                .apply_transition(origin, id, status)
                .await
                .map(|_| ()),
            LeadAction::Delete { id } => self.workflow.delete(origin, id).await,
            LeadAction::AddNote { id } => self.prompt_note(origin, callback.sender_id, id).await,
        };

        if let Err(e) = result {
            self.report(origin.map(|m| m.chat_id), &e).await;
        }
    }

    /// Asks the operator for a note and remembers the prompt.
    async fn prompt_note(&self, origin: Option<MessageRef>, user_id: u64, id: LeadId) -> Result<(), WorkflowError> {
        let Some(chat_id) = origin.map(|m| m.chat_id) else {
            debug!(lead_id = %id, "Note requested from an inaccessible message");
            return Ok(());
        };
        if self.workflow.store().find_by_id(id).await?.is_none() {
            return Err(StoreError::NotFound(id).into());
        }

        self.transport()
            .send_message(chat_id, &prompt_text(id), Some(ReplyMarkup::ForceReply))
            .await?;
        self.pending.remember(OperatorKey { chat_id, user_id }, id).await;
        Ok(())
    }

    /// Tells the chat about store failures; transport failures are only logged.
    async fn report(&self, chat_id: Option<i64>, err: &WorkflowError) {
        let text = match err {
            WorkflowError::Store(StoreError::NotFound(id)) => {
                debug!(lead_id = %id, "Lead not found");
                lead_not_found_text(*id)
            }
            WorkflowError::Store(e) => {
                error!(error = %e, "Store operation failed");
                STORE_ERROR_TEXT.to_string()
            }
            WorkflowError::Transport(e) => {
                warn!(error = %e, "Chat operation failed");
                return;
            }
        };

        let Some(chat_id) = chat_id else {
            return;
        };
        if let Err(e) = self.transport().send_message(chat_id, &text, None).await {
            warn!(chat_id, error = %e, "Failed to report error to chat");
        }
    }
}
