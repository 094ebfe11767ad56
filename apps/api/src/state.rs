use std::sync::Arc;

use crate::config::Config;
use crate::store::AlertStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable alert persistence. Postgres in production, in-memory in tests.
    pub store: Arc<dyn AlertStore>,
    pub config: Config,
}
