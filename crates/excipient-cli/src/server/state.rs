//! Application state for the web server.

use std::sync::Arc;

use excipient::{ExcipientCategories, ExcipientService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Search service with its upstream clients.
    pub service: Arc<ExcipientService>,
    /// Excipient categories for the selection UI, loaded once at start.
    pub categories: Arc<ExcipientCategories>,
}

impl AppState {
    pub fn new(service: Arc<ExcipientService>, categories: Arc<ExcipientCategories>) -> Self {
        Self {
            service,
            categories,
        }
    }
}
