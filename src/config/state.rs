// Application state module
// Process-wide configuration and the document store, shared by every request

use crate::store::DocumentStore;

use super::types::Config;

/// Application state
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = DocumentStore::new(config.storage.raw_path(), config.storage.parsed_path());
        Self { config, store }
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
