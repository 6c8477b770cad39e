use crate::location::{LocationStore, SearchIndex};
use std::sync::Arc;

/// Shared, read-only server state. No locks: nothing here mutates.
pub struct AppState {
    pub store: Arc<LocationStore>,
    pub index: SearchIndex,
    pub default_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<LocationStore>, default_limit: usize) -> Self {
        Self {
            index: SearchIndex::new(Arc::clone(&store)),
            store,
            default_limit,
        }
    }
}
