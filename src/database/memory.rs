use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::gateway::{ItemStore, StoreError};
use super::models::{Item, ItemChanges};
use crate::types;

/// In-process item store for tests and local development.
/// Conditional writes check and write under one write guard.
#[derive(Default)]
pub struct InMemoryItemStore {
    items: RwLock<HashMap<String, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn put(&self, item: &Item) -> Result<(), StoreError> {
        self.items.write().await.insert(item.id.clone(), item.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn query_by_owner(&self, user_id: &str) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().await;
        let mut owned: Vec<Item> = items
            .values()
            .filter(|item| item.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(owned)
    }

    async fn conditional_update(
        &self,
        id: &str,
        changes: &ItemChanges,
        expected_user_id: &str,
    ) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;
        match items.get_mut(id) {
            Some(item) if item.is_owned_by(expected_user_id) => {
                changes.apply_to(item);
                item.updated_at = types::refreshed_after(item.updated_at);
                Ok(item.clone())
            }
            Some(_) => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: true,
            }),
            None => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: false,
            }),
        }
    }

    async fn conditional_delete(&self, id: &str, expected_user_id: &str) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;
        let owner_matches = items.get(id).map(|item| item.is_owned_by(expected_user_id));
        match owner_matches {
            Some(true) => items.remove(id).ok_or_else(|| StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: false,
            }),
            Some(false) => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: true,
            }),
            None => Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                existed: false,
            }),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
