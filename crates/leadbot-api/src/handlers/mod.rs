//! API request handlers.

pub mod health;
pub mod leads;
pub mod webhook;

pub use health::*;
pub use leads::*;
pub use webhook::*;
