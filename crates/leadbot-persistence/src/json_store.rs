//! JSON-file lead store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use leadbot_models::{Lead, LeadFilter, LeadId, LeadStatus, NewLead, SortOrder};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::atomic::{atomic_write, read_json_optional};
use crate::error::{Result, StoreError};
use crate::store::LeadStore;
use crate::table::LeadTable;

/// File name of the lead table inside the data directory.
pub const LEADS_FILE: &str = "leads.json";

/// Lead store backed by a single JSON file.
///
/// ```text
/// data_dir/
/// └── leads.json    # {"last_id": 12, "leads": [...]}
/// ```
///
/// Every mutation rewrites the file atomically. The in-memory copy is only
/// replaced after the write succeeds, so a failed write leaves both unchanged.
pub struct JsonLeadStore {
    path: PathBuf,
    table: Mutex<LeadTable>,
}

impl JsonLeadStore {
    /// Opens the store in `data_dir`, loading existing leads if present.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let path = data_dir.as_ref().join(LEADS_FILE);
        let mut table: LeadTable = read_json_optional(&path)?.unwrap_or_default();
        table.normalize();
        info!(path = %path.display(), leads = table.count(None), "Lead store opened");
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Applies `change` to a copy of the table, persists it, then commits.
    async fn mutate<T>(&self, change: impl FnOnce(&mut LeadTable) -> Result<T>) -> Result<T> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();
        let out = change(&mut next)?;

        let bytes = serde_json::to_vec_pretty(&next)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        *table = next;
        debug!(path = %self.path.display(), "Lead table persisted");
        Ok(out)
    }
}

#[async_trait]
impl LeadStore for JsonLeadStore {
    async fn create(&self, fields: NewLead) -> Result<Lead> {
        self.mutate(|t| Ok(t.insert(fields, Utc::now()))).await
    }

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>> {
        Ok(self.table.lock().await.get(id).cloned())
    }

    async fn find_many(&self, filter: &LeadFilter, order: SortOrder, limit: usize) -> Result<Vec<Lead>> {
        Ok(self.table.lock().await.select(filter, order, limit))
    }

    async fn update_status(&self, id: LeadId, status: LeadStatus) -> Result<Lead> {
        self.mutate(|t| {
            let lead = t.get_mut(id)?;
            lead.status = status;
            Ok(lead.clone())
        })
        .await
    }

    async fn update_notes(&self, id: LeadId, notes: &str) -> Result<Lead> {
        self.mutate(|t| {
            let lead = t.get_mut(id)?;
            lead.notes = Some(notes.to_string());
            Ok(lead.clone())
        })
        .await
    }

    async fn delete(&self, id: LeadId) -> Result<()> {
        self.mutate(|t| t.remove(id).map(|_| ())).await
    }

    async fn count(&self, filter: Option<&LeadFilter>) -> Result<usize> {
        Ok(self.table.lock().await.count(filter))
    }

    async fn group_count_by_status(&self) -> Result<BTreeMap<LeadStatus, usize>> {
        Ok(self.table.lock().await.group_by_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_leads_survive_reopen() {
        let dir = tempdir().unwrap();

        let id = {
            let store = JsonLeadStore::open(dir.path()).unwrap();
            let lead = store
                .create(NewLead::new("Ivan", "+79990001122", "Lamborghini Huracán"))
                .await
                .unwrap();
            store.update_status(lead.id, LeadStatus::InWork).await.unwrap();
            store.update_notes(lead.id, "call back Monday").await.unwrap();
            lead.id
        };

        let reopened = JsonLeadStore::open(dir.path()).unwrap();
        let lead = reopened.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(lead.status, LeadStatus::InWork);
        assert_eq!(lead.notes.as_deref(), Some("call back Monday"));
    }

    #[tokio::test]
    async fn test_ids_continue_after_reopen_and_delete() {
        let dir = tempdir().unwrap();
        let store = JsonLeadStore::open(dir.path()).unwrap();
        store.create(NewLead::new("a", "1", "")).await.unwrap();
        let second = store.create(NewLead::new("b", "2", "")).await.unwrap();
        store.delete(second.id).await.unwrap();
        drop(store);

        let store = JsonLeadStore::open(dir.path()).unwrap();
        let third = store.create(NewLead::new("c", "3", "")).await.unwrap();
        assert_eq!(third.id, LeadId(3));
    }

    #[tokio::test]
    async fn test_unordered_file_is_usable() {
        let dir = tempdir().unwrap();
        {
            let store = JsonLeadStore::open(dir.path()).unwrap();
            for phone in ["1", "2", "3"] {
                store.create(NewLead::new("n", phone, "")).await.unwrap();
            }
        }

        // Reorder the file as a hand edit might.
        let path = dir.path().join(LEADS_FILE);
        let mut doc: serde_json::Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        doc["leads"].as_array_mut().unwrap().reverse();
        std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

        let store = JsonLeadStore::open(dir.path()).unwrap();
        assert_eq!(store.find_by_id(LeadId(1)).await.unwrap().unwrap().phone, "1");
        store.update_status(LeadId(3), LeadStatus::Done).await.unwrap();
        assert_eq!(
            store.find_by_id(LeadId(3)).await.unwrap().unwrap().status,
            LeadStatus::Done
        );
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_table_untouched() {
        let dir = tempdir().unwrap();
        let store = JsonLeadStore::open(dir.path()).unwrap();

        let err = store.update_notes(LeadId(5), "x").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count(None).await.unwrap(), 0);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_phone_search() {
        let dir = tempdir().unwrap();
        let store = JsonLeadStore::open(dir.path()).unwrap();
        store.create(NewLead::new("a", "+79990001122", "")).await.unwrap();
        store.create(NewLead::new("b", "+70000000000", "")).await.unwrap();

        let found = store
            .find_many(&LeadFilter::new().with_phone_containing("0011"), SortOrder::NewestFirst, 10)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "a");
    }
}
