//! Lead card rendering.

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use leadbot_models::Lead;

use crate::transport::InlineKeyboard;
use crate::workflow::controls_for;

/// Escapes text for Telegram HTML parse mode.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rendered card: HTML text plus the controls valid for the lead's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub text: String,
    pub keyboard: InlineKeyboard,
}

/// Renders lead cards with timestamps in the operators' local time.
#[derive(Debug, Clone, Copy)]
pub struct CardRenderer {
    offset: FixedOffset,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self::with_utc_offset_hours(3)
    }
}

impl CardRenderer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Falls back to UTC when the offset is out of range.
    pub fn with_utc_offset_hours(hours: i32) -> Self {
        let offset = hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn render(&self, lead: &Lead) -> Card {
        Card {
            text: self.render_text(lead),
            keyboard: controls_for(lead),
        }
    }

    pub fn render_text(&self, lead: &Lead) -> String {
        let name = if lead.name.is_empty() {
            "<i>Без имени</i>".to_string()
        } else {
            html_escape(&lead.name)
        };
        let car = if lead.car.is_empty() {
            "-".to_string()
        } else {
            html_escape(&lead.car)
        };
        let created = lead.created_at.with_timezone(&self.offset).format("%d.%m.%Y %H:%M");

        let mut text = format!(
            "🚗 <b>Заявка #{}</b>\n\
             👤 {}\n\
             📱 <code>{}</code>\n\
             🚘 {}\n\
             🕒 {}\n\
             📌 Статус: <b>{}</b>",
            lead.id,
            name,
            html_escape(&lead.phone),
            car,
            created,
            lead.status.label(),
        );
        if let Some(note) = lead.note() {
            text.push_str(&format!("\n📝 <i>{}</i>", html_escape(note)));
        }
        text
    }

    /// Start of the local day containing `now`, as a UTC instant.
    pub fn local_midnight(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_date = now.with_timezone(&self.offset).date_naive();
        let offset = chrono::Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&(local_date.and_time(NaiveTime::MIN) - offset))
    }
}
