//! Note capture.
//!
//! Pressing "add note" sends a prompt that asks the operator to reply with the
//! note text. The reply is bound to its lead in two ways: the prompt text
//! embeds `#<id>` (recognizable from the replied-to message), and the prompt
//! is remembered per operator with an expiry so plain follow-up text works too.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use leadbot_models::LeadId;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::debug;

/// Fixed start of every note prompt.
pub const NOTE_PROMPT_PREFIX: &str = "✍️ Заметка к заявке";

/// Default lifetime of a pending prompt.
pub const DEFAULT_NOTE_TTL: Duration = Duration::from_secs(15 * 60);

/// Prompt text for a lead.
pub fn prompt_text(id: LeadId) -> String {
    format!("{NOTE_PROMPT_PREFIX} #{id}\n\nОтветьте на это сообщение текстом заметки.")
}

pub fn is_note_prompt(text: &str) -> bool {
    text.starts_with(NOTE_PROMPT_PREFIX)
}

fn lead_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#(\d+)").expect("invalid lead id regex"))
}

/// First `#<digits>` in the text, if it fits an id.
pub fn extract_lead_id(text: &str) -> Option<LeadId> {
    lead_id_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(LeadId)
}

/// Identifies one operator in one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperatorKey {
    pub chat_id: i64,
    pub user_id: u64,
}

/// Prompts awaiting a note, one per operator.
#[derive(Debug)]
pub struct PendingNotes {
    ttl: Duration,
    entries: Mutex<HashMap<OperatorKey, (LeadId, Instant)>>,
}

impl Default for PendingNotes {
    fn default() -> Self {
        Self::new(DEFAULT_NOTE_TTL)
    }
}

impl PendingNotes {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Records a prompt, replacing any earlier one for the operator.
    pub async fn remember(&self, key: OperatorKey, id: LeadId) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (_, at)| at.elapsed() < self.ttl);
        entries.insert(key, (id, Instant::now()));
    }

    /// Removes and returns the operator's live prompt.
    pub async fn take(&self, key: OperatorKey) -> Option<LeadId> {
        let (id, at) = self.entries.lock().await.remove(&key)?;
        if at.elapsed() >= self.ttl {
            debug!(chat_id = key.chat_id, lead_id = %id, "Pending note prompt expired");
            return None;
        }
        Some(id)
    }

    pub async fn forget(&self, key: OperatorKey) {
        self.entries.lock().await.remove(&key);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
