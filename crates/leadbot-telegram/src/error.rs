//! Error types for the Telegram side of the lead workflow.

use std::path::PathBuf;

use leadbot_persistence::StoreError;
use thiserror::Error;

/// Failure to obtain the bot token.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Neither a plaintext token nor a ciphertext + passphrase pair is configured.
    #[error("bot token not configured: set TG_BOT_TOKEN, or ENCRYPTED_TG_TOKEN (or a token file) together with ENCRYPT_PW")]
    Missing,

    /// The stored ciphertext is not `IV:TAG:CIPHERTEXT` with valid base64 segments.
    #[error("invalid encrypted token format: {0}")]
    Malformed(String),

    /// Wrong passphrase or tampered/truncated ciphertext.
    #[error("failed to decrypt token: authentication failed")]
    Authentication,

    #[error("failed to encrypt token")]
    Encryption,

    #[error("failed to read token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure talking to the Bot API.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// No operator chat configured for lead notifications.
    #[error("operator chat id not configured: set TG_CHAT_ID")]
    MissingChatId,

    #[error("Telegram request failed: {0}")]
    Request(String),

    /// The Bot API answered with a non-success status.
    #[error("Telegram rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

impl TransportError {
    /// Whether the failure comes from missing or broken configuration rather
    /// than from the remote side.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TransportError::Credential(_) | TransportError::MissingChatId
        )
    }
}

impl From<teloxide::RequestError> for TransportError {
    fn from(e: teloxide::RequestError) -> Self {
        TransportError::Request(e.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        TransportError::Request(e.without_url().to_string())
    }
}

/// Failure of a workflow step triggered from chat.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Callback payload that cannot be decoded. Indicates stale or foreign UI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackError {
    #[error("callback payload {0:?} has no lead id")]
    MissingId(String),

    #[error("callback lead id {0:?} is not an integer")]
    InvalidId(String),

    #[error("unknown callback action {0:?}")]
    UnknownAction(String),

    #[error("unknown status {0:?} in callback payload")]
    UnknownStatus(String),
}

/// Result type for Telegram transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
