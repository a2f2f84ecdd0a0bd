//! Inbound chat events, decoupled from teloxide's update types.

use teloxide::types::{Update, UpdateKind};

use crate::transport::MessageRef;

/// A text message sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: Option<u64>,
    pub text: String,
    /// Text of the message this one replies to.
    pub reply_to_text: Option<String>,
}

/// An inline button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub query_id: String,
    pub sender_id: u64,
    /// The message carrying the pressed button, if still accessible.
    pub message: Option<MessageRef>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

impl InboundEvent {
    /// Extracts the parts of an update the router acts on.
    ///
    /// Non-text messages and other update kinds yield `None`.
    pub fn from_update(update: &Update) -> Option<Self> {
        match &update.kind {
            UpdateKind::Message(msg) => {
                let text = msg.text()?;
                Some(InboundEvent::Message(IncomingMessage {
                    chat_id: msg.chat.id.0,
                    message_id: msg.id.0,
                    sender_id: msg.from.as_ref().map(|u| u.id.0),
                    text: text.to_string(),
                    reply_to_text: msg
                        .reply_to_message()
                        .and_then(|m| m.text())
                        .map(str::to_string),
                }))
            }
            UpdateKind::CallbackQuery(q) => Some(InboundEvent::Callback(IncomingCallback {
                query_id: q.id.to_string(),
                sender_id: q.from.id.0,
                message: q.message.as_ref().map(|m| MessageRef {
                    chat_id: m.chat().id.0,
                    message_id: m.id().0,
                }),
                data: q.data.clone(),
            })),
            _ => None,
        }
    }

    pub fn chat_id(&self) -> Option<i64> {
        match self {
            InboundEvent::Message(m) => Some(m.chat_id),
            InboundEvent::Callback(c) => c.message.map(|m| m.chat_id),
        }
    }
}
