//! The chat operations the workflow needs.
//!
//! Workflow and router code talk to [`ChatTransport`] only, so scenarios can be
//! exercised against a recording fake instead of the Bot API.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Address of a sent message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// One inline button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl ToString) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.to_string(),
        }
    }
}

/// Rows of inline buttons attached to a message.
///
/// Serializes to the Bot API `InlineKeyboardMarkup` shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboard {
    #[serde(rename = "inline_keyboard")]
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Iterates over all callback payloads, row by row.
    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.callback_data.as_str())
    }
}

/// Markup that may accompany a new message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    Inline(InlineKeyboard),
    /// Persistent reply keyboard; each inner vec is a row of labels.
    Menu(Vec<Vec<String>>),
    /// Ask the client to open a reply to this message.
    ForceReply,
}

/// Chat operations used by the lead workflow.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends an HTML message.
    async fn send_message(&self, chat_id: i64, text: &str, markup: Option<ReplyMarkup>) -> Result<MessageRef>;

    /// Replaces the text and inline keyboard of an existing message.
    async fn edit_message(&self, message: MessageRef, text: &str, keyboard: &InlineKeyboard) -> Result<()>;

    async fn delete_message(&self, message: MessageRef) -> Result<()>;

    /// Acknowledges a button press so the client stops its spinner.
    async fn answer_callback(&self, query_id: &str) -> Result<()>;
}
