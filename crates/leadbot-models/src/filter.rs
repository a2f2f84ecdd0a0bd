//! Lead query filters.

use chrono::{DateTime, Utc};

use crate::lead::{Lead, LeadStatus};

/// Criteria for selecting leads. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub phone_contains: Option<String>,
    pub created_since: Option<DateTime<Utc>>,
}

impl LeadFilter {
    /// Creates a filter that matches every lead.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a single status.
    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts to phones containing the given fragment.
    pub fn with_phone_containing(mut self, fragment: impl Into<String>) -> Self {
        self.phone_contains = Some(fragment.into());
        self
    }

    /// Restricts to leads created at or after the given instant.
    pub fn with_created_since(mut self, since: DateTime<Utc>) -> Self {
        self.created_since = Some(since);
        self
    }

    /// Checks whether a lead satisfies every set criterion.
    pub fn matches(&self, lead: &Lead) -> bool {
        if let Some(status) = self.status {
            if lead.status != status {
                return false;
            }
        }
        if let Some(fragment) = &self.phone_contains {
            if !lead.phone.contains(fragment.as_str()) {
                return false;
            }
        }
        if let Some(since) = self.created_since {
            if lead.created_at < since {
                return false;
            }
        }
        true
    }
}

/// Ordering by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}
