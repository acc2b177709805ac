pub mod controller;
pub mod error;
pub mod models;
pub mod persistence;
pub mod store;

use anyhow::Context;
use booklist_kernel::Settings;

pub use controller::{ReadingListController, ReadingListState, StateChange};
pub use error::ReadingListError;
pub use models::{BookEntry, BookId};
pub use store::BookStore;

/// Build the store selected by `settings`, then create and initialize a controller over it.
pub async fn open_reading_list(settings: &Settings) -> anyhow::Result<ReadingListController> {
    let kv = booklist_store::create_store(&settings.storage)
        .with_context(|| "failed to create book store")?;
    let store = BookStore::new(kv, settings.storage.key.clone());

    let mut controller = ReadingListController::new(store);
    controller.initialize().await;

    tracing::info!(
        module = "books",
        environment = ?settings.environment,
        count = controller.len(),
        "reading list ready"
    );
    Ok(controller)
}


#[cfg(test)]
mod tests {
    use super::*;
    use booklist_kernel::{StorageBackend, StorageSettings};

    #[tokio::test]
    async fn open_reading_list_reads_the_configured_key() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            storage: StorageSettings {
                backend: StorageBackend::File,
                data_dir: dir.path().to_path_buf(),
                key: "shelf".to_string(),
            },
            ..Settings::default()
        };
        std::fs::write(
            dir.path().join("shelf.json"),
            r#"[{"id":"1","bookName":"Dune","authorName":"Herbert","read":false}]"#,
        )
        .unwrap();

        let list = open_reading_list(&settings).await.unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].book_name(), "Dune");
        list.shutdown().await;
    }
}
