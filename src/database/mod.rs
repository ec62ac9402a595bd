pub mod gateway;
pub mod memory;
pub mod models;
pub mod postgres;

use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};

pub use gateway::{ItemStore, StoreError};
pub use memory::InMemoryItemStore;
pub use postgres::PgItemStore;

/// Build the configured item store
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn ItemStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::info!("Using in-memory item store");
            Ok(Arc::new(InMemoryItemStore::new()))
        }
        StorageBackend::Postgres => Ok(Arc::new(PgItemStore::connect(config).await?)),
    }
}
