//! File-backed store: every key lives in `<data_dir>/<key>.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{validate_key, KeyValueStore, StoreResult};

const EXTENSION: &str = "json";

/// Durable store rooted at a data directory.
///
/// Writes go to a sibling temporary file which is synced and then renamed
/// over the target, so readers see either the previous value or the new one.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{EXTENSION}")))
    }

    /// Temporary file for `key`, unique per process so two binaries sharing a
    /// data directory never write into the same one.
    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root
            .join(format!(".{key}.{EXTENSION}.{}.tmp", std::process::id()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.temp_path_for(key);

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.root).await?;

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(value.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &path).await?;

        debug!(key = %key, path = %path.display(), bytes = value.len(), "wrote store value");
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(value) => {
                debug!(key = %key, bytes = value.len(), "read store value");
                Ok(Some(value))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
