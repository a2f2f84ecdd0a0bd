//! Volatile lead store, used for development runs and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use leadbot_models::{Lead, LeadFilter, LeadId, LeadStatus, NewLead, SortOrder};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::LeadStore;
use crate::table::LeadTable;

/// Lead store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    table: RwLock<LeadTable>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn create(&self, fields: NewLead) -> Result<Lead> {
        Ok(self.table.write().await.insert(fields, Utc::now()))
    }

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>> {
        Ok(self.table.read().await.get(id).cloned())
    }

    async fn find_many(&self, filter: &LeadFilter, order: SortOrder, limit: usize) -> Result<Vec<Lead>> {
        Ok(self.table.read().await.select(filter, order, limit))
    }

    async fn update_status(&self, id: LeadId, status: LeadStatus) -> Result<Lead> {
        let mut table = self.table.write().await;
        let lead = table.get_mut(id)?;
        lead.status = status;
        Ok(lead.clone())
    }

    async fn update_notes(&self, id: LeadId, notes: &str) -> Result<Lead> {
        let mut table = self.table.write().await;
        let lead = table.get_mut(id)?;
        lead.notes = Some(notes.to_string());
        Ok(lead.clone())
    }

    async fn delete(&self, id: LeadId) -> Result<()> {
        self.table.write().await.remove(id).map(|_| ())
    }

    async fn count(&self, filter: Option<&LeadFilter>) -> Result<usize> {
        Ok(self.table.read().await.count(filter))
    }

    async fn group_count_by_status(&self) -> Result<BTreeMap<LeadStatus, usize>> {
        Ok(self.table.read().await.group_by_status())
    }
}
