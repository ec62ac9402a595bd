use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{Item, ItemChanges, NewItem};
use crate::database::{ItemStore, StoreError};
use crate::error::ApiError;
use crate::types;

/// Ownership-enforced item operations over an injected store
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Items owned by the caller, oldest first
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Item>, ApiError> {
        let items = self.store.query_by_owner(principal.subject()).await?;
        debug!("Listed {} items for {}", items.len(), principal.subject());
        Ok(items)
    }

    /// Store a new item with a server-generated id and timestamps
    pub async fn create(&self, principal: &Principal, fields: NewItem) -> Result<Item, ApiError> {
        let item = Item::new(
            Uuid::new_v4().to_string(),
            principal.subject().to_string(),
            fields,
            types::now(),
        );
        self.store.put(&item).await?;
        debug!("Created item {} for {}", item.id, item.user_id);
        Ok(item)
    }

    pub async fn get(&self, principal: &Principal, id: &str) -> Result<Item, ApiError> {
        let item = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Item not found"))?;

        if !item.is_owned_by(principal.subject()) {
            warn!("{} attempted to read item {} owned by another user", principal.subject(), id);
            return Err(ApiError::forbidden("Forbidden"));
        }
        Ok(item)
    }

    /// Missing items and foreign owners both answer 403
    pub async fn update(&self, principal: &Principal, id: &str, changes: ItemChanges) -> Result<Item, ApiError> {
        let item = self
            .store
            .conditional_update(id, &changes, principal.subject())
            .await?;
        debug!("Updated item {} for {}", item.id, item.user_id);
        Ok(item)
    }

    /// Foreign owner answers 403, a missing item 404
    pub async fn delete(&self, principal: &Principal, id: &str) -> Result<Item, ApiError> {
        match self.store.conditional_delete(id, principal.subject()).await {
            Ok(item) => {
                debug!("Deleted item {} for {}", item.id, item.user_id);
                Ok(item)
            }
            Err(StoreError::PreconditionFailed { existed: false, .. }) => Err(ApiError::not_found("Item not found")),
            Err(err) => Err(err.into()),
        }
    }
}
