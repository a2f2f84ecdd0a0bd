//! Core data models for the rental lead bot.
//!
//! Leads are the only persisted entity; everything shown in chat is rendered
//! from a [`Lead`] record.

pub mod filter;
pub mod lead;

pub use filter::{LeadFilter, SortOrder};
pub use lead::{Lead, LeadId, LeadStatus, NewLead, UnknownStatus};
