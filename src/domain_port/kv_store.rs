use std::collections::HashMap;
use std::time::Duration;

/// Key-value primitives the session records are built from.
#[async_trait::async_trait]
pub trait KvStore: Send + Sync {
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;
    /// Returns whether the member was present.
    async fn set_remove(&self, key: &str, member: &str) -> Result<bool, StoreError>;
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    async fn hash_set(&self, key: &str, fields: &[(&str, &str)]) -> Result<(), StoreError>;
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;
    /// Returns whether the field was present.
    async fn hash_delete_field(&self, key: &str, field: &str) -> Result<bool, StoreError>;

    /// Returns whether the key existed. Concurrent deletes of one key see
    /// `true` at most once.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
    /// Returns whether the key existed and received the TTL.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
