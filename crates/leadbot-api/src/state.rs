//! Application state shared across handlers.

use std::sync::Arc;

use leadbot_persistence::LeadStore;
use leadbot_telegram::{LeadRouter, Notifier};

use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub store: Arc<dyn LeadStore>,
    /// Sends new-lead cards to the operator chat.
    pub notifier: Arc<Notifier>,
    /// Handles webhook updates.
    pub router: Arc<LeadRouter>,
}

impl AppState {
    pub fn new(config: ApiConfig, store: Arc<dyn LeadStore>, notifier: Notifier, router: Arc<LeadRouter>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            notifier: Arc::new(notifier),
            router,
        }
    }
}
