//! Lead status workflow.
//!
//! The store is the durability point of every step. Chat messages are a view
//! of store state: they are edited after a successful write, and an edit that
//! fails only leaves the view stale.

use std::sync::Arc;

use leadbot_models::{Lead, LeadId, LeadStatus};
use leadbot_persistence::LeadStore;
use tracing::{debug, info, warn};

use crate::callback::LeadAction;
use crate::card::CardRenderer;
use crate::error::WorkflowError;
use crate::transport::{ChatTransport, InlineButton, InlineKeyboard, MessageRef, ReplyMarkup};

/// Confirmation sent after a note is stored.
pub const NOTE_SAVED_TEXT: &str = "📝 Заметка сохранена";

/// Statuses reachable from `status` through card controls, in button order.
pub fn next_statuses(status: LeadStatus) -> &'static [LeadStatus] {
    match status {
        LeadStatus::New => &[LeadStatus::InWork, LeadStatus::Spam],
        LeadStatus::InWork => &[LeadStatus::Done, LeadStatus::New, LeadStatus::Spam],
        LeadStatus::Done => &[LeadStatus::New],
        LeadStatus::Spam => &[LeadStatus::InWork],
    }
}

/// Only closed branches expose deletion.
pub fn can_delete(status: LeadStatus) -> bool {
    matches!(status, LeadStatus::Done | LeadStatus::Spam)
}

/// Button label for moving from `from` to `to`.
pub fn transition_label(from: LeadStatus, to: LeadStatus) -> &'static str {
    match (from, to) {
        (LeadStatus::Spam, LeadStatus::InWork) => "♻️ Восстановить",
        (_, LeadStatus::InWork) => "🛠 В работу",
        (LeadStatus::InWork, LeadStatus::New) => "⏸ Отложить",
        (_, LeadStatus::New) => "↩️ Вернуть",
        (_, LeadStatus::Done) => "✅ Готово",
        (_, LeadStatus::Spam) => "🗑 Спам",
    }
}

/// Inline controls for a lead in its current status.
pub fn controls_for(lead: &Lead) -> InlineKeyboard {
    let id = lead.id;
    let transitions = next_statuses(lead.status)
        .iter()
        .map(|&status| {
            InlineButton::new(
                transition_label(lead.status, status),
                LeadAction::SetStatus { id, status },
            )
        })
        .collect();

    let mut rows = vec![transitions];
    if can_delete(lead.status) {
        rows.push(vec![InlineButton::new("❌ Удалить", LeadAction::Delete { id })]);
    }
    rows.push(vec![InlineButton::new("📝 Заметка", LeadAction::AddNote { id })]);
    InlineKeyboard::new(rows)
}

/// Applies operator actions to the store and reflects them in chat.
pub struct Workflow {
    store: Arc<dyn LeadStore>,
    transport: Arc<dyn ChatTransport>,
    renderer: CardRenderer,
}

impl Workflow {
    pub fn new(store: Arc<dyn LeadStore>, transport: Arc<dyn ChatTransport>, renderer: CardRenderer) -> Self {
        Self {
            store,
            transport,
            renderer,
        }
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    pub fn store(&self) -> &Arc<dyn LeadStore> {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn ChatTransport> {
        &self.transport
    }

    /// Persists the new status, then edits the originating card in place.
    ///
    /// Edit failures are swallowed; the returned lead is the persisted state.
    pub async fn apply_transition(
        &self,
        origin: Option<MessageRef>,
        id: LeadId,
        status: LeadStatus,
    ) -> Result<Lead, WorkflowError> {
        let lead = self.store.update_status(id, status).await?;
        info!(lead_id = %id, status = %status, "Lead status updated");

        if let Some(message) = origin {
            let card = self.renderer.render(&lead);
            if let Err(e) = self.transport.edit_message(message, &card.text, &card.keyboard).await {
                debug!(lead_id = %id, error = %e, "Card edit failed, chat view left stale");
            }
        }
        Ok(lead)
    }

    /// Deletes the lead, then the originating card.
    ///
    /// A lead that is already gone counts as deleted.
    pub async fn delete(&self, origin: Option<MessageRef>, id: LeadId) -> Result<(), WorkflowError> {
        match self.store.delete(id).await {
            Ok(()) => info!(lead_id = %id, "Lead deleted"),
            Err(e) if e.is_not_found() => debug!(lead_id = %id, "Lead already deleted"),
            Err(e) => return Err(e.into()),
        }

        if let Some(message) = origin {
            if let Err(e) = self.transport.delete_message(message).await {
                warn!(lead_id = %id, error = %e, "Failed to remove card message");
            }
        }
        Ok(())
    }

    /// Sends a fresh card for `lead` to `chat_id`.
    pub async fn send_card(&self, chat_id: i64, lead: &Lead) -> Result<MessageRef, WorkflowError> {
        let card = self.renderer.render(lead);
        let sent = self
            .transport
            .send_message(chat_id, &card.text, Some(ReplyMarkup::Inline(card.keyboard)))
            .await?;
        Ok(sent)
    }

    /// Stores a note, confirms it, and posts the refreshed card.
    pub async fn save_note(&self, chat_id: i64, id: LeadId, text: &str) -> Result<Lead, WorkflowError> {
        let lead = self.store.update_notes(id, text).await?;
        info!(lead_id = %id, chat_id, "Lead note saved");

        self.transport.send_message(chat_id, NOTE_SAVED_TEXT, None).await?;
        self.send_card(chat_id, &lead).await?;
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::recording::{Call, RecordingTransport};
    use leadbot_models::NewLead;
    use leadbot_persistence::{MemoryLeadStore, StoreError};
    use std::sync::atomic::Ordering;

    fn payload_set(keyboard: &InlineKeyboard) -> Vec<String> {
        keyboard.payloads().map(str::to_string).collect()
    }

    async fn setup() -> (Arc<MemoryLeadStore>, Arc<RecordingTransport>, Workflow, Lead) {
        let store = Arc::new(MemoryLeadStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let workflow = Workflow::new(store.clone(), transport.clone(), CardRenderer::default());
        let lead = store
            .create(NewLead::new("Ivan", "+79990001122", "Lamborghini Huracán"))
            .await
            .unwrap();
        (store, transport, workflow, lead)
    }

    const ORIGIN: MessageRef = MessageRef {
        chat_id: -100,
        message_id: 9,
    };

    #[test]
    fn test_controls_per_status() {
        let mut lead = Lead::from_submission(LeadId(4), NewLead::new("a", "1", "b"), chrono::Utc::now());

        lead.status = LeadStatus::New;
        assert_eq!(payload_set(&controls_for(&lead)), ["status_4_in_work", "status_4_spam", "note_4"]);

        lead.status = LeadStatus::InWork;
        assert_eq!(
            payload_set(&controls_for(&lead)),
            ["status_4_done", "status_4_new", "status_4_spam", "note_4"]
        );

        lead.status = LeadStatus::Done;
        assert_eq!(payload_set(&controls_for(&lead)), ["status_4_new", "delete_4", "note_4"]);

        lead.status = LeadStatus::Spam;
        assert_eq!(payload_set(&controls_for(&lead)), ["status_4_in_work", "delete_4", "note_4"]);
    }

    #[test]
    fn test_every_rendered_payload_decodes() {
        for status in LeadStatus::ALL {
            let mut lead = Lead::from_submission(LeadId(77), NewLead::new("", "1", ""), chrono::Utc::now());
            lead.status = status;
            for payload in controls_for(&lead).payloads() {
                let action = LeadAction::decode(payload).unwrap();
                assert_eq!(action.lead_id(), LeadId(77));
                assert!(payload.len() <= 64);
            }
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(transition_label(LeadStatus::Spam, LeadStatus::InWork), "♻️ Восстановить");
        assert_eq!(transition_label(LeadStatus::New, LeadStatus::InWork), "🛠 В работу");
        assert_eq!(transition_label(LeadStatus::InWork, LeadStatus::New), "⏸ Отложить");
        assert_eq!(transition_label(LeadStatus::Done, LeadStatus::New), "↩️ Вернуть");
    }

    #[tokio::test]
    async fn test_transition_persists_and_edits_card() {
        let (store, transport, workflow, lead) = setup().await;

        for target in [LeadStatus::InWork, LeadStatus::Done, LeadStatus::New, LeadStatus::Spam] {
            transport.clear().await;
            let updated = workflow.apply_transition(Some(ORIGIN), lead.id, target).await.unwrap();

            assert_eq!(store.find_by_id(lead.id).await.unwrap().unwrap().status, target);
            let calls = transport.calls().await;
            assert_eq!(calls.len(), 1);
            match &calls[0] {
                Call::Edited { message, text, keyboard } => {
                    assert_eq!(*message, ORIGIN);
                    assert!(text.contains(target.label()));
                    assert_eq!(*keyboard, controls_for(&updated));
                }
                other => panic!("unexpected call {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_edit_failure_is_swallowed() {
        let (store, transport, workflow, lead) = setup().await;
        transport.fail_edits.store(true, Ordering::SeqCst);

        let updated = workflow
            .apply_transition(Some(ORIGIN), lead.id, LeadStatus::InWork)
            .await
            .unwrap();

        assert_eq!(updated.status, LeadStatus::InWork);
        assert_eq!(store.find_by_id(lead.id).await.unwrap().unwrap().status, LeadStatus::InWork);
    }

    #[tokio::test]
    async fn test_transition_on_missing_lead_leaves_chat_untouched() {
        let (_store, transport, workflow, _lead) = setup().await;

        let err = workflow
            .apply_transition(Some(ORIGIN), LeadId(999), LeadStatus::Done)
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Store(StoreError::NotFound(LeadId(999)))));
        assert!(transport.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (store, transport, workflow, lead) = setup().await;

        workflow.delete(Some(ORIGIN), lead.id).await.unwrap();
        assert!(store.find_by_id(lead.id).await.unwrap().is_none());
        assert_eq!(transport.calls().await, vec![Call::Deleted(ORIGIN)]);

        // Retried delivery of the same press.
        workflow.delete(Some(ORIGIN), lead.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_survives_message_removal_failure() {
        let (store, transport, workflow, lead) = setup().await;
        transport.fail_deletes.store(true, Ordering::SeqCst);

        workflow.delete(Some(ORIGIN), lead.id).await.unwrap();
        assert!(store.find_by_id(lead.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_note_confirms_and_sends_card() {
        let (store, transport, workflow, lead) = setup().await;

        workflow.save_note(-100, lead.id, "перезвонить вечером").await.unwrap();

        assert_eq!(
            store.find_by_id(lead.id).await.unwrap().unwrap().notes.as_deref(),
            Some("перезвонить вечером")
        );
        let texts = transport.sent_texts().await;
        assert_eq!(texts.len(), 2);
        assert_eq!(texts[0], NOTE_SAVED_TEXT);
        assert!(texts[1].contains("📝 <i>перезвонить вечером</i>"));
    }
}
