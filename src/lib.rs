pub mod config;
pub mod error;
pub mod rest;
pub mod tasks;

use std::sync::Arc;

use config::TaskdConfig;
use tasks::store::TaskStore;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<TaskdConfig>,
    /// Process-wide task storage, keyed by client address.
    pub store: Arc<TaskStore>,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Build a context from a finished config with an empty store.
    pub fn new(config: TaskdConfig) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(TaskStore::new()),
            started_at: std::time::Instant::now(),
        }
    }
}
