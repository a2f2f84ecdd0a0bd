//! The lead store interface.

use std::collections::BTreeMap;

use async_trait::async_trait;
use leadbot_models::{Lead, LeadFilter, LeadId, LeadStatus, NewLead, SortOrder};

use crate::error::Result;

/// Persistent collection of leads.
///
/// Every method is a single-record atomic operation; no multi-record
/// transactions are offered. Concurrent writers to the same lead race and the
/// last write wins.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persists a new lead with status `new` and a fresh id.
    async fn create(&self, fields: NewLead) -> Result<Lead>;

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>>;

    /// Returns up to `limit` matching leads ordered by creation time.
    async fn find_many(&self, filter: &LeadFilter, order: SortOrder, limit: usize) -> Result<Vec<Lead>>;

    /// Sets the status and returns the updated record.
    async fn update_status(&self, id: LeadId, status: LeadStatus) -> Result<Lead>;

    /// Replaces the note and returns the updated record.
    async fn update_notes(&self, id: LeadId, notes: &str) -> Result<Lead>;

    /// Hard-deletes the record. Fails with `NotFound` if it is already gone.
    async fn delete(&self, id: LeadId) -> Result<()>;

    async fn count(&self, filter: Option<&LeadFilter>) -> Result<usize>;

    /// Counts leads per status; statuses with no leads are absent.
    async fn group_count_by_status(&self) -> Result<BTreeMap<LeadStatus, usize>>;
}
