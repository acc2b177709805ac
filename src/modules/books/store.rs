//! Whole-collection persistence of the reading list on top of a key-value store.

use std::collections::HashSet;
use std::sync::Arc;

use booklist_store::KeyValueStore;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::error::ReadingListError;
use super::models::BookEntry;

/// Key the collection is stored under unless configured otherwise.
pub const DEFAULT_KEY: &str = "books";

/// Reads and writes the full list of entries as one JSON array under a single key.
#[derive(Clone)]
pub struct BookStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl BookStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn with_default_key(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::new(kv, DEFAULT_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Fetch the saved collection.
    ///
    /// Never fails: a missing key, an I/O error or an undecodable blob all
    /// yield an empty list, the latter two after logging.
    pub async fn load(&self) -> Vec<BookEntry> {
        match self.try_load().await {
            Ok(entries) => entries,
            Err(err) => {
                error!(key = %self.key, error = %err, "failed to load books");
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<BookEntry>, ReadingListError> {
        let Some(raw) = self
            .kv
            .get(&self.key)
            .await
            .map_err(ReadingListError::StoreRead)?
        else {
            debug!(key = %self.key, "no saved books");
            return Ok(Vec::new());
        };

        let entries = dedup_ids(decode(&raw)?);
        debug!(key = %self.key, count = entries.len(), "loaded books");
        Ok(entries)
    }

    /// Serialize and write the full collection, replacing the stored value.
    pub async fn save(&self, entries: &[BookEntry]) -> Result<(), ReadingListError> {
        let result = self.try_save(entries).await;
        match &result {
            Ok(()) => debug!(key = %self.key, count = entries.len(), "saved books"),
            Err(err) => error!(key = %self.key, error = %err, "failed to save books"),
        }
        result
    }

    async fn try_save(&self, entries: &[BookEntry]) -> Result<(), ReadingListError> {
        let raw = encode(entries)?;
        self.kv
            .set(&self.key, &raw)
            .await
            .map_err(ReadingListError::StoreWrite)
    }
}

fn decode(raw: &str) -> Result<Vec<BookEntry>, ReadingListError> {
    serde_json::from_str(raw).map_err(ReadingListError::Corrupt)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, ReadingListError> {
    serde_json::to_string(value).map_err(ReadingListError::Encode)
}

/// Keep the first entry for every id.
fn dedup_ids(entries: Vec<BookEntry>) -> Vec<BookEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let before = entries.len();
    let kept: Vec<BookEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id().clone()))
        .collect();

    if kept.len() != before {
        warn!(
            dropped = before - kept.len(),
            "stored books contained duplicate ids; kept first occurrences"
        );
    }
    kept
}
