//! Store trait definitions.

use async_trait::async_trait;

use crate::StoreResult;

/// Trait for key-value store backends
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store a value, replacing whatever the key held before
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Retrieve a value, `None` if the key was never written
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
}
