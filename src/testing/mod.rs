use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::database::models::{Item, ItemChanges};
use crate::database::{InMemoryItemStore, ItemStore, StoreError};
use crate::services::ItemService;

/// Item service over a fresh in-memory store
pub fn memory_service() -> ItemService {
    ItemService::new(Arc::new(InMemoryItemStore::new()))
}

/// `{"id": id}` path parameters
pub fn path_params(id: &str) -> HashMap<String, String> {
    HashMap::from([("id".to_string(), id.to_string())])
}

/// Store whose every call fails as if the backend were down
pub struct FailingItemStore;

fn unavailable() -> StoreError {
    StoreError::Unavailable("simulated outage".to_string())
}

#[async_trait]
impl ItemStore for FailingItemStore {
    async fn put(&self, _item: &Item) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<Item>, StoreError> {
        Err(unavailable())
    }

    async fn query_by_owner(&self, _user_id: &str) -> Result<Vec<Item>, StoreError> {
        Err(unavailable())
    }

    async fn conditional_update(
        &self,
        _id: &str,
        _changes: &ItemChanges,
        _expected_user_id: &str,
    ) -> Result<Item, StoreError> {
        Err(unavailable())
    }

    async fn conditional_delete(&self, _id: &str, _expected_user_id: &str) -> Result<Item, StoreError> {
        Err(unavailable())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
