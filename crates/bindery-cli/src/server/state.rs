//! Application state for the query API.

use std::sync::Arc;
use tokio::sync::RwLock;

use bindery::Record;

/// Shared application state.
///
/// The collection is loaded once at startup and only ever read. The lock
/// leaves room for a reload endpoint without an API change.
#[derive(Clone)]
pub struct AppState {
    /// The records being served.
    pub library: Arc<RwLock<Vec<Record>>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            library: Arc::new(RwLock::new(records)),
        }
    }
}
