//! Command and menu handlers.

use chrono::Utc;
use leadbot_models::{Lead, LeadFilter, LeadId, LeadStatus, SortOrder};
use teloxide::utils::command::BotCommands;
use tracing::debug;

use crate::error::WorkflowError;
use crate::menu::{
    empty_list_text, menu_markup, LeadStats, MenuItem, FIND_USAGE_TEXT, HELP_TEXT, NOTHING_FOUND_TEXT, WELCOME_TEXT,
};
use crate::workflow::Workflow;

/// Cards shown per status list.
pub const LIST_LIMIT: usize = 5;

/// Cards shown per search.
pub const FIND_LIMIT: usize = 10;

/// Bot commands that can be invoked with /.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Команды:")]
pub enum Command {
    #[command(description = "показать меню")]
    Start,

    #[command(description = "справка")]
    Help,

    #[command(description = "поиск по номеру заявки или телефону: /find <номер|телефон>")]
    Find(String),

    #[command(description = "новые заявки")]
    New,

    #[command(description = "статистика")]
    Stats,
}

/// Runs a parsed command in `chat_id`.
pub async fn handle_command(workflow: &Workflow, chat_id: i64, command: Command) -> Result<(), WorkflowError> {
    debug!(chat_id, ?command, "Handling command");
    match command {
        Command::Start => handle_start(workflow, chat_id).await,
        Command::Help => handle_help(workflow, chat_id).await,
        Command::Find(query) => handle_find(workflow, chat_id, &query).await,
        Command::New => handle_list(workflow, chat_id, LeadStatus::New).await,
        Command::Stats => handle_stats(workflow, chat_id).await,
    }
}

/// Runs a tapped menu entry in `chat_id`.
pub async fn handle_menu(workflow: &Workflow, chat_id: i64, item: MenuItem) -> Result<(), WorkflowError> {
    debug!(chat_id, label = item.label(), "Handling menu tap");
    match item {
        MenuItem::Leads(status) => handle_list(workflow, chat_id, status).await,
        MenuItem::Stats => handle_stats(workflow, chat_id).await,
    }
}

/// Welcome text plus help, with the menu keyboard attached.
pub async fn handle_start(workflow: &Workflow, chat_id: i64) -> Result<(), WorkflowError> {
    let text = format!("{WELCOME_TEXT}\n\n{HELP_TEXT}");
    workflow
        .transport()
        .send_message(chat_id, &text, Some(menu_markup()))
        .await?;
    Ok(())
}

pub async fn handle_help(workflow: &Workflow, chat_id: i64) -> Result<(), WorkflowError> {
    workflow.transport().send_message(chat_id, HELP_TEXT, None).await?;
    Ok(())
}

/// Sends the newest leads with `status`, one card each.
pub async fn handle_list(workflow: &Workflow, chat_id: i64, status: LeadStatus) -> Result<(), WorkflowError> {
    let filter = LeadFilter::new().with_status(status);
    let leads = workflow
        .store()
        .find_many(&filter, SortOrder::NewestFirst, LIST_LIMIT)
        .await?;

    if leads.is_empty() {
        workflow
            .transport()
            .send_message(chat_id, &empty_list_text(status), None)
            .await?;
        return Ok(());
    }
    send_cards(workflow, chat_id, &leads).await
}

/// Looks a lead up by id, falling back to a phone substring search.
///
/// An all-digit query is a lead id and nothing else; any other query, such as
/// `+7999...`, is a phone fragment.
pub async fn handle_find(workflow: &Workflow, chat_id: i64, query: &str) -> Result<(), WorkflowError> {
    let query = query.trim();
    if query.is_empty() {
        workflow.transport().send_message(chat_id, FIND_USAGE_TEXT, None).await?;
        return Ok(());
    }

    let leads = find_leads(workflow, query).await?;
    if leads.is_empty() {
        workflow.transport().send_message(chat_id, NOTHING_FOUND_TEXT, None).await?;
        return Ok(());
    }
    send_cards(workflow, chat_id, &leads).await
}

async fn find_leads(workflow: &Workflow, query: &str) -> Result<Vec<Lead>, WorkflowError> {
    let store = workflow.store();
    if query.bytes().all(|b| b.is_ascii_digit()) {
        let Ok(id) = query.parse::<i64>() else {
            return Ok(Vec::new());
        };
        return Ok(store.find_by_id(LeadId(id)).await?.into_iter().collect());
    }

    let filter = LeadFilter::new().with_phone_containing(query);
    Ok(store.find_many(&filter, SortOrder::NewestFirst, FIND_LIMIT).await?)
}

/// Totals, leads since local midnight, and per-status counts.
pub async fn collect_stats(workflow: &Workflow) -> Result<LeadStats, WorkflowError> {
    let store = workflow.store();
    let since = workflow.renderer().local_midnight(Utc::now());
    let today = LeadFilter::new().with_created_since(since);

    Ok(LeadStats {
        total: store.count(None).await?,
        today: store.count(Some(&today)).await?,
        by_status: store.group_count_by_status().await?,
    })
}

pub async fn handle_stats(workflow: &Workflow, chat_id: i64) -> Result<(), WorkflowError> {
    let stats = collect_stats(workflow).await?;
    workflow
        .transport()
        .send_message(chat_id, &stats.render(), None)
        .await?;
    Ok(())
}

async fn send_cards(workflow: &Workflow, chat_id: i64, leads: &[Lead]) -> Result<(), WorkflowError> {
    for lead in leads {
        workflow.send_card(chat_id, lead).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardRenderer;
    use crate::transport::recording::{Call, RecordingTransport};
    use crate::transport::ReplyMarkup;
    use leadbot_models::NewLead;
    use leadbot_persistence::{LeadStore, MemoryLeadStore};
    use std::sync::Arc;

    const CHAT: i64 = -100;

    async fn setup() -> (Arc<MemoryLeadStore>, Arc<RecordingTransport>, Workflow) {
        let store = Arc::new(MemoryLeadStore::new());
        let transport = Arc::new(RecordingTransport::new());
        let workflow = Workflow::new(store.clone(), transport.clone(), CardRenderer::default());
        (store, transport, workflow)
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "lead_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/start@lead_bot", "lead_bot").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/find +7999", "lead_bot").unwrap(),
            Command::Find("+7999".to_string())
        );
        assert!(Command::parse("/archive", "lead_bot").is_err());
    }

    #[tokio::test]
    async fn test_start_attaches_menu() {
        let (_store, transport, workflow) = setup().await;
        handle_command(&workflow, CHAT, Command::Start).await.unwrap();

        let calls = transport.calls().await;
        assert!(matches!(
            &calls[0],
            Call::Sent { markup: Some(ReplyMarkup::Menu(_)), text, .. } if text.contains("/find")
        ));
    }

    #[tokio::test]
    async fn test_list_shows_newest_five_of_status() {
        let (store, transport, workflow) = setup().await;
        for i in 0..7 {
            store.create(NewLead::new("n", format!("+7000{i}"), "c")).await.unwrap();
        }
        store.update_status(LeadId(7), LeadStatus::Spam).await.unwrap();

        handle_menu(&workflow, CHAT, MenuItem::Leads(LeadStatus::New)).await.unwrap();

        let texts = transport.sent_texts().await;
        assert_eq!(texts.len(), LIST_LIMIT);
        assert!(texts[0].contains("Заявка #6"));
        assert!(texts[4].contains("Заявка #2"));
    }

    #[tokio::test]
    async fn test_empty_list() {
        let (_store, transport, workflow) = setup().await;
        handle_menu(&workflow, CHAT, MenuItem::Leads(LeadStatus::Done)).await.unwrap();
        assert_eq!(transport.sent_texts().await, vec![empty_list_text(LeadStatus::Done)]);
    }

    #[tokio::test]
    async fn test_find_by_id_or_phone() {
        let (store, transport, workflow) = setup().await;
        store.create(NewLead::new("a", "+79990001122", "")).await.unwrap();
        store.create(NewLead::new("b", "+79990003344", "")).await.unwrap();

        handle_find(&workflow, CHAT, "2").await.unwrap();
        let texts = transport.sent_texts().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Заявка #2"));

        transport.clear().await;
        handle_find(&workflow, CHAT, "+7999000").await.unwrap();
        assert_eq!(transport.sent_texts().await.len(), 2);

        transport.clear().await;
        handle_find(&workflow, CHAT, "+79990003344").await.unwrap();
        let texts = transport.sent_texts().await;
        assert_eq!(texts.len(), 1);
        assert!(texts[0].contains("Заявка #2"));
    }

    #[tokio::test]
    async fn test_find_integer_is_id_only() {
        let (store, transport, workflow) = setup().await;
        store.create(NewLead::new("Ivan", "+79420001122", "BMW")).await.unwrap();

        // The phone contains "42" but no lead has id 42.
        handle_find(&workflow, CHAT, "42").await.unwrap();
        handle_find(&workflow, CHAT, "99999999999999999999").await.unwrap();

        assert_eq!(
            transport.sent_texts().await,
            vec![NOTHING_FOUND_TEXT.to_string(), NOTHING_FOUND_TEXT.to_string()]
        );
        assert!(transport
            .calls()
            .await
            .iter()
            .all(|call| matches!(call, Call::Sent { markup: None, .. })));
    }

    #[tokio::test]
    async fn test_find_usage_and_nothing_found() {
        let (_store, transport, workflow) = setup().await;
        handle_find(&workflow, CHAT, "   ").await.unwrap();
        handle_find(&workflow, CHAT, "555").await.unwrap();
        assert_eq!(
            transport.sent_texts().await,
            vec![FIND_USAGE_TEXT.to_string(), NOTHING_FOUND_TEXT.to_string()]
        );
    }

    #[tokio::test]
    async fn test_stats() {
        let (store, transport, workflow) = setup().await;
        for _ in 0..3 {
            store.create(NewLead::new("n", "1", "c")).await.unwrap();
        }
        store.update_status(LeadId(1), LeadStatus::Done).await.unwrap();

        let stats = collect_stats(&workflow).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.today, 3);
        assert_eq!(stats.count(LeadStatus::New), 2);
        assert_eq!(stats.count(LeadStatus::Done), 1);

        handle_command(&workflow, CHAT, Command::Stats).await.unwrap();
        assert!(transport.sent_texts().await[0].contains("Всего: <b>3</b>"));
    }
}
