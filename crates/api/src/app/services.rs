use std::sync::Arc;

use shareit_infra::config::{AppConfig, DatabaseConfig};
use shareit_infra::services::Services;
use shareit_infra::store::{InMemoryStore, Store, StoreError};

/// Wire services over the store the configuration asks for.
pub async fn build_services(config: &AppConfig) -> Result<Services, StoreError> {
    let store: Arc<dyn Store> = match &config.database {
        Some(db) => persistent_store(db).await?,
        None => {
            tracing::info!("using in-memory stores");
            Arc::new(InMemoryStore::new())
        }
    };
    Ok(Services::with_system_clock(store))
}

/// Services over a fresh in-memory store (dev/test).
pub fn in_memory_services() -> Services {
    Services::with_system_clock(Arc::new(InMemoryStore::new()))
}

#[cfg(feature = "postgres")]
async fn persistent_store(db: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
    let store =
        shareit_infra::store::PostgresStore::connect(&db.url, db.max_connections).await?;
    tracing::info!(max_connections = db.max_connections, "using postgres stores");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn persistent_store(_db: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
    tracing::warn!(
        "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
    );
    Ok(Arc::new(InMemoryStore::new()))
}
