//! Key-value device store for the booklist.
//!
//! Values are opaque strings stored under short names. Two backends ship:
//! - [`FileStore`]: one file per key under a data directory
//! - [`MemoryStore`]: process-local map, gone when the process exits

mod file;
mod memory;
mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::KeyValueStore;

use std::sync::Arc;

use booklist_kernel::{StorageBackend, StorageSettings};
use thiserror::Error;

/// Error type for store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Key contains characters the backend cannot map to a location
    #[error("invalid store key: {0:?}")]
    InvalidKey(String),

    /// Backend-specific failure
    #[error("store backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Create the store selected by the storage settings.
pub fn create_store(settings: &StorageSettings) -> StoreResult<Arc<dyn KeyValueStore>> {
    match settings.backend {
        StorageBackend::File => {
            tracing::info!(
                data_dir = %settings.data_dir.display(),
                "using file-backed store"
            );
            Ok(Arc::new(FileStore::new(&settings.data_dir)))
        }
        StorageBackend::Memory => {
            tracing::info!("using in-memory store; nothing outlives this process");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Keys map directly to file names, so they are kept to a conservative alphabet.
pub(crate) fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_keys() {
        assert!(validate_key("books").is_ok());
        assert!(validate_key("books-v1.backup_2").is_ok());
    }

    #[test]
    fn rejects_path_like_keys() {
        for key in ["", ".hidden", "../books", "a/b", "a\\b", "spa ce"] {
            assert!(
                matches!(validate_key(key), Err(StoreError::InvalidKey(_))),
                "key {key:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn factory_builds_memory_backend() {
        let settings = StorageSettings {
            backend: StorageBackend::Memory,
            ..StorageSettings::default()
        };
        let store = create_store(&settings).unwrap();

        store.set("books", "[]").await.unwrap();
        assert_eq!(store.get("books").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn factory_builds_file_backend_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let settings = StorageSettings {
            backend: StorageBackend::File,
            data_dir: dir.path().join("nested"),
            key: "books".to_string(),
        };
        let store = create_store(&settings).unwrap();

        store.set("books", "[]").await.unwrap();
        assert!(dir.path().join("nested").join("books.json").exists());
    }
}
