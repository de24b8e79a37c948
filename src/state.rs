use std::sync::Arc;

use crate::config::AppConfig;
use crate::repository::CustomerRepository;

/// The shared application state.
///
/// Cloned into every handler by axum. The repository is injected here rather
/// than reached through a global, so tests can hand in a double.
#[derive(Clone)]
pub struct AppState {
    /// Customer persistence, already wrapped in error classification.
    pub repo: Arc<dyn CustomerRepository>,
    /// The application configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CustomerRepository>, config: AppConfig) -> Self {
        Self { repo, config: Arc::new(config) }
    }
}
