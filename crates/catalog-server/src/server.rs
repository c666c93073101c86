use std::sync::Arc;

use catalog_core::seed_demo_data;
use catalog_store::{Collection, DocumentStore, InMemoryDocumentStore, JsonFileDocumentStore};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, cors_layer};
use crate::state::AppState;

/// The catalog HTTP server.
pub struct CatalogServer {
    config: ServerConfig,
    state: AppState,
}

impl CatalogServer {
    /// Open the configured store and seed it if asked to.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store = open_store(&config)?;
        let state = AppState::new(store, config.engine.clone());
        if config.seed_demo_data {
            let inserted = seed_demo_data(state.store(), state.categories(), state.parts())?;
            if !inserted {
                tracing::debug!("demo data already present");
            }
        }
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        let router = build_router(self.state.clone());
        match cors_layer(&self.config.allowed_origins) {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    /// Serve until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("catalog server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

/// The store named by `config`: a JSON snapshot if `data_path` is set,
/// memory otherwise. Category names and serial numbers are unique keys.
pub fn open_store(config: &ServerConfig) -> ServerResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match &config.data_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "opening catalog snapshot");
            Arc::new(
                JsonFileDocumentStore::open(path)?
                    .with_unique_key(Collection::Categories, "name")
                    .with_unique_key(Collection::Parts, "serial_number"),
            )
        }
        None => Arc::new(
            InMemoryDocumentStore::new()
                .with_unique_key(Collection::Categories, "name")
                .with_unique_key(Collection::Parts, "serial_number"),
        ),
    };
    Ok(store)
}
