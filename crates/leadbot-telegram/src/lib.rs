//! Telegram side of the lead CRM.
//!
//! New leads are announced in an operator chat as cards with inline controls.
//! Operators move leads through the status workflow by pressing those
//! controls, look leads up with commands and menu taps, and attach notes by
//! replying to a prompt.
//!
//! # Status workflow
//!
//! | From      | Controls                          |
//! |-----------|-----------------------------------|
//! | `new`     | in work, spam                     |
//! | `in_work` | done, postpone (to new), spam     |
//! | `done`    | back to new, delete               |
//! | `spam`    | restore (to in work), delete      |
//!
//! Every card also carries an "add note" control.
//!
//! # Environment Variables
//!
//! - `TG_BOT_TOKEN`: plaintext bot token
//! - `ENCRYPTED_TG_TOKEN` / `TG_TOKEN_FILE` + `ENCRYPT_PW`: encrypted token and passphrase
//! - `TG_CHAT_ID`: operator chat for notifications
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use leadbot_persistence::MemoryLeadStore;
//! use leadbot_telegram::{CardRenderer, CredentialSource, LeadRouter, TelegramClient, TelegramTransport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(TelegramClient::new(
//!     CredentialSource::plain("123:ABC"),
//!     url::Url::parse("https://api.telegram.org/")?,
//! ));
//! let router = Arc::new(LeadRouter::new(
//!     Arc::new(MemoryLeadStore::new()),
//!     Arc::new(TelegramTransport::new(client.clone())),
//!     CardRenderer::default(),
//!     Duration::from_secs(900),
//! ));
//! leadbot_telegram::bot::run_polling(&client, router).await?;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod callback;
pub mod card;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod event;
pub mod handlers;
pub mod menu;
pub mod notes;
pub mod notifier;
pub mod router;
pub mod transport;
pub mod workflow;

pub use callback::{CallbackData, LeadAction};
pub use card::{Card, CardRenderer};
pub use client::{TelegramClient, TelegramTransport};
pub use config::TelegramConfig;
pub use credential::{decrypt_token, encrypt_token, CredentialSource};
pub use error::{CallbackError, CredentialError, Result, TransportError, WorkflowError};
pub use event::InboundEvent;
pub use notifier::Notifier;
pub use router::LeadRouter;
pub use transport::{ChatTransport, InlineButton, InlineKeyboard, MessageRef, ReplyMarkup};
pub use workflow::Workflow;
