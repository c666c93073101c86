use std::sync::Arc;

use catalog_core::{CatalogResult, CategoryHierarchy, EngineConfig, PartPlacement};
use catalog_store::{Collection, DocumentStore, InMemoryDocumentStore};

use crate::error::ApiError;

/// Shared request state: the store plus the two engines.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
    categories: CategoryHierarchy,
    parts: PartPlacement,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, engine: EngineConfig) -> Self {
        Self {
            store,
            categories: CategoryHierarchy::new(engine),
            parts: PartPlacement::new(),
        }
    }

    /// Fresh in-memory catalog with natural keys enforced by the store.
    pub fn in_memory(engine: EngineConfig) -> Self {
        let store = InMemoryDocumentStore::new()
            .with_unique_key(Collection::Categories, "name")
            .with_unique_key(Collection::Parts, "serial_number");
        Self::new(Arc::new(store), engine)
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn categories(&self) -> &CategoryHierarchy {
        &self.categories
    }

    pub fn parts(&self) -> &PartPlacement {
        &self.parts
    }

    /// Run an engine operation on the blocking pool; file-backed stores do
    /// disk I/O on every write.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&AppState) -> CatalogResult<T> + Send + 'static,
    {
        let state = self.clone();
        tokio::task::spawn_blocking(move || op(&state))
            .await
            .map_err(|e| ApiError::Internal(format!("catalog task failed: {e}")))?
            .map_err(ApiError::from)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("engine", self.categories.config())
            .field("atomic_batches", &self.store.supports_atomic_batch())
            .finish()
    }
}
