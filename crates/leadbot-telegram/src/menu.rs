//! Reply-keyboard menu and summary statistics.

use std::collections::BTreeMap;

use leadbot_models::LeadStatus;

use crate::transport::ReplyMarkup;

/// A tappable menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// List the newest leads with the bound status.
    Leads(LeadStatus),
    Stats,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::Leads(LeadStatus::New),
        MenuItem::Leads(LeadStatus::InWork),
        MenuItem::Leads(LeadStatus::Done),
        MenuItem::Leads(LeadStatus::Spam),
        MenuItem::Stats,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Leads(LeadStatus::New) => "🆕 Новые",
            MenuItem::Leads(LeadStatus::InWork) => "🛠 В работе",
            MenuItem::Leads(LeadStatus::Done) => "✅ Готовые",
            MenuItem::Leads(LeadStatus::Spam) => "🗑 Спам",
            MenuItem::Stats => "📊 Статистика",
        }
    }

    /// Exact label match; surrounding whitespace is ignored.
    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|item| item.label() == text)
    }
}

/// Persistent keyboard shown by `/start`.
pub fn menu_markup() -> ReplyMarkup {
    let label = |item: MenuItem| item.label().to_string();
    ReplyMarkup::Menu(vec![
        vec![label(MenuItem::ALL[0]), label(MenuItem::ALL[1])],
        vec![label(MenuItem::ALL[2]), label(MenuItem::ALL[3])],
        vec![label(MenuItem::Stats)],
    ])
}

pub const WELCOME_TEXT: &str = "👋 <b>CRM заявок</b>\n\nВыберите раздел в меню ниже.";

pub const HELP_TEXT: &str = "<b>Команды</b>\n\
    /start - показать меню\n\
    /new - новые заявки\n\
    /find &lt;номер или телефон&gt; - поиск заявки\n\
    /stats - статистика\n\
    /help - эта справка\n\n\
    Кнопки под заявкой меняют её статус. «📝 Заметка» добавляет комментарий.";

pub const UNKNOWN_COMMAND_TEXT: &str = "🤷 Неизвестная команда. Список команд: /help";

pub const FIND_USAGE_TEXT: &str = "Использование: <code>/find 42</code> или <code>/find +7999000</code>";

pub const NOTHING_FOUND_TEXT: &str = "🔍 Ничего не найдено";

/// Line shown when a status list is empty.
pub fn empty_list_text(status: LeadStatus) -> String {
    format!("📭 Нет заявок со статусом «{}»", status.label())
}

/// Aggregate counts shown by the stats entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadStats {
    pub total: usize,
    pub today: usize,
    pub by_status: BTreeMap<LeadStatus, usize>,
}

impl LeadStats {
    pub fn count(&self, status: LeadStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut text = format!(
            "📊 <b>Статистика</b>\n\nВсего: <b>{}</b>\nСегодня: <b>{}</b>\n",
            self.total, self.today
        );
        for status in LeadStatus::ALL {
            text.push_str(&format!("\n{}: {}", status.label(), self.count(status)));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_resolve() {
        for item in MenuItem::ALL {
            assert_eq!(MenuItem::from_label(item.label()), Some(item));
        }
        assert_eq!(MenuItem::from_label(" 📊 Статистика "), Some(MenuItem::Stats));
        assert_eq!(MenuItem::from_label("Статистика"), None);
    }

    #[test]
    fn test_menu_contains_every_label() {
        let ReplyMarkup::Menu(rows) = menu_markup() else {
            panic!("menu must be a reply keyboard");
        };
        let labels: Vec<&str> = rows.iter().flatten().map(String::as_str).collect();
        for item in MenuItem::ALL {
            assert!(labels.contains(&item.label()));
        }
    }

    #[test]
    fn test_stats_render_includes_zero_counts() {
        let stats = LeadStats {
            total: 3,
            today: 1,
            by_status: BTreeMap::from([(LeadStatus::New, 2), (LeadStatus::Done, 1)]),
        };
        let text = stats.render();

        assert!(text.contains("Всего: <b>3</b>"));
        assert!(text.contains("Сегодня: <b>1</b>"));
        assert!(text.contains("🆕 Новая: 2"));
        assert!(text.contains("🗑 Спам: 0"));
    }
}
