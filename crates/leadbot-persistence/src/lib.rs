//! Lead persistence.
//!
//! The [`LeadStore`] trait is the only way the rest of the system touches
//! lead records. Two engines are provided:
//!
//! - [`MemoryLeadStore`]: process memory, for development and tests
//! - [`JsonLeadStore`]: a single JSON file written atomically (temp file, then rename)
//!
//! # Example
//!
//! ```no_run
//! use leadbot_models::NewLead;
//! use leadbot_persistence::{JsonLeadStore, LeadStore};
//!
//! # async fn run() -> leadbot_persistence::Result<()> {
//! let store = JsonLeadStore::open("./data")?;
//! let lead = store.create(NewLead::new("Ivan", "+79990001122", "Huracán")).await?;
//! assert!(store.find_by_id(lead.id).await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod error;
pub mod json_store;
pub mod memory;
pub mod store;
mod table;

pub use error::{Result, StoreError};
pub use json_store::JsonLeadStore;
pub use memory::MemoryLeadStore;
pub use store::LeadStore;
