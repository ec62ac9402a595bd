use async_trait::async_trait;
use thiserror::Error;

use super::models::{Item, ItemChanges};

/// Errors surfaced by an item store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The owner condition of a conditional write did not hold.
    /// `existed` tells a foreign owner apart from a missing record.
    #[error("Conditional check failed for item {id}")]
    PreconditionFailed { id: String, existed: bool },

    /// Backend I/O, throttling or pool exhaustion; retryable by the caller
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Key-value access to items: primary key `id`, secondary index on
/// `(user_id, created_at)`. Conditional writes compare the stored owner
/// atomically with the write.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Unconditional insert or overwrite
    async fn put(&self, item: &Item) -> Result<(), StoreError>;

    /// No ownership check; callers decide what a foreign owner means
    async fn get_by_id(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Items of one owner, ascending by `created_at` then `id`
    async fn query_by_owner(&self, user_id: &str) -> Result<Vec<Item>, StoreError>;

    /// Merge `changes` and refresh `updated_at` if the stored owner is
    /// `expected_user_id`. Returns the item as stored after the write.
    async fn conditional_update(
        &self,
        id: &str,
        changes: &ItemChanges,
        expected_user_id: &str,
    ) -> Result<Item, StoreError>;

    /// Remove the item if the stored owner is `expected_user_id`.
    /// Returns the removed item.
    async fn conditional_delete(&self, id: &str, expected_user_id: &str) -> Result<Item, StoreError>;

    /// Cheap liveness probe
    async fn health_check(&self) -> Result<(), StoreError>;
}
