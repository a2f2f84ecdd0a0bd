//! In-memory lead table shared by the store engines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use leadbot_models::{Lead, LeadFilter, LeadId, LeadStatus, NewLead, SortOrder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Leads kept sorted by id, plus the id counter.
///
/// `last_id` only grows, so ids of deleted leads are never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LeadTable {
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    leads: Vec<Lead>,
}

impl LeadTable {
    pub(crate) fn insert(&mut self, fields: NewLead, now: DateTime<Utc>) -> Lead {
        let floor = self.leads.last().map(|l| l.id.get()).unwrap_or(0);
        self.last_id = self.last_id.max(floor) + 1;
        let lead = Lead::from_submission(LeadId(self.last_id), fields, now);
        self.leads.push(lead.clone());
        lead
    }

    /// Restores id order and the counter after loading data written elsewhere.
    pub(crate) fn normalize(&mut self) {
        self.leads.sort_by_key(|l| l.id);
        let floor = self.leads.last().map(|l| l.id.get()).unwrap_or(0);
        self.last_id = self.last_id.max(floor);
    }

    fn position(&self, id: LeadId) -> Option<usize> {
        self.leads.binary_search_by_key(&id, |l| l.id).ok()
    }

    pub(crate) fn get(&self, id: LeadId) -> Option<&Lead> {
        self.position(id).map(|i| &self.leads[i])
    }

    pub(crate) fn get_mut(&mut self, id: LeadId) -> Result<&mut Lead> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(&mut self.leads[index])
    }

    pub(crate) fn remove(&mut self, id: LeadId) -> Result<Lead> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        Ok(self.leads.remove(index))
    }

    pub(crate) fn select(&self, filter: &LeadFilter, order: SortOrder, limit: usize) -> Vec<Lead> {
        let mut found: Vec<Lead> = self
            .leads
            .iter()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();

        // Ties on created_at fall back to id so ordering is stable.
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if order == SortOrder::NewestFirst {
            found.reverse();
        }
        found.truncate(limit);
        found
    }

    pub(crate) fn count(&self, filter: Option<&LeadFilter>) -> usize {
        match filter {
            Some(filter) => self.leads.iter().filter(|l| filter.matches(l)).count(),
            None => self.leads.len(),
        }
    }

    pub(crate) fn group_by_status(&self) -> BTreeMap<LeadStatus, usize> {
        let mut counts = BTreeMap::new();
        for lead in &self.leads {
            *counts.entry(lead.status).or_insert(0) += 1;
        }
        counts
    }
}
