//! Lead types.
//!
//! A lead is a booking inquiry submitted from the landing page and worked
//! through a small status workflow by the sales team.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned lead identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub i64);

impl LeadId {
    /// Returns the raw numeric value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for LeadId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FromStr for LeadId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Workflow stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Freshly submitted, nobody picked it up yet.
    #[default]
    New,
    /// An operator is working on it.
    InWork,
    /// Closed successfully.
    Done,
    /// Junk submission.
    Spam,
}

impl LeadStatus {
    /// All statuses in display order.
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::New,
        LeadStatus::InWork,
        LeadStatus::Done,
        LeadStatus::Spam,
    ];

    /// Wire token used in callback payloads and persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::InWork => "in_work",
            LeadStatus::Done => "done",
            LeadStatus::Spam => "spam",
        }
    }

    /// Localized label shown to operators.
    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "🆕 Новая",
            LeadStatus::InWork => "🛠 В работе",
            LeadStatus::Done => "✅ Готово",
            LeadStatus::Spam => "🗑 Спам",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the four status tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown lead status: {:?}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for LeadStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "in_work" => Ok(LeadStatus::InWork),
            "done" => Ok(LeadStatus::Done),
            "spam" => Ok(LeadStatus::Spam),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Fields supplied by the landing page form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub car: String,
}

impl NewLead {
    /// Creates submission fields, trimming surrounding whitespace.
    pub fn new(name: impl Into<String>, phone: impl Into<String>, car: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            phone: phone.into().trim().to_string(),
            car: car.into().trim().to_string(),
        }
    }
}

/// A persisted lead record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Immutable, store-assigned identifier.
    pub id: LeadId,

    /// Customer name, may be empty.
    pub name: String,

    /// Customer phone number.
    pub phone: String,

    /// Requested car, may be empty.
    pub car: String,

    /// Current workflow stage.
    #[serde(default)]
    pub status: LeadStatus,

    /// Operator note, last write wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the lead was submitted.
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Builds a fresh `new` lead from submission fields.
    pub fn from_submission(id: LeadId, fields: NewLead, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            phone: fields.phone,
            car: fields.car,
            status: LeadStatus::New,
            notes: None,
            created_at,
        }
    }

    /// Returns the note if it carries any non-whitespace text.
    pub fn note(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}
