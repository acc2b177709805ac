//! The reading list controller: sole owner and mutation surface of the list.

use tokio::sync::broadcast;
use tracing::{debug, info};

use super::error::ReadingListError;
use super::models::{BookEntry, BookId};
use super::persistence::PersistenceWorker;
use super::store::BookStore;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Everything the rendering surface draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadingListState {
    books: Vec<BookEntry>,
    search_text: String,
    is_adding: bool,
    book_name: String,
    author_name: String,
}

impl ReadingListState {
    pub fn books(&self) -> &[BookEntry] {
        &self.books
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Whether the add-entry dialog is open
    pub fn is_adding(&self) -> bool {
        self.is_adding
    }

    /// Title typed into the add dialog so far
    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    /// Author typed into the add dialog so far
    pub fn author_name(&self) -> &str {
        &self.author_name
    }
}

/// Notification sent to subscribers after every state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Loaded { count: usize },
    Added(BookId),
    Deleted(BookId),
    ReadToggled { id: BookId, read: bool },
    SearchChanged,
    DialogOpened,
    DialogClosed,
    DraftChanged,
}

/// Owns the in-memory reading list and mirrors it to the store after every mutation.
///
/// Mutations take `&mut self` and update memory synchronously; the write to
/// the store happens later on the persistence worker and never rolls the
/// in-memory change back. Must be created inside a Tokio runtime.
pub struct ReadingListController {
    state: ReadingListState,
    store: BookStore,
    persistence: PersistenceWorker,
    changes: broadcast::Sender<StateChange>,
    /// Set by the first load and by the first mutation, whichever comes first.
    initialized: bool,
}

impl ReadingListController {
    pub fn new(store: BookStore) -> Self {
        let persistence = PersistenceWorker::spawn(store.clone());
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            state: ReadingListState::default(),
            store,
            persistence,
            changes,
            initialized: false,
        }
    }

    /// Replace the list with whatever the store holds.
    ///
    /// Only the first call loads, and only if nothing was added, deleted or
    /// toggled before it. Later calls leave the in-memory list untouched.
    pub async fn initialize(&mut self) {
        if self.initialized {
            debug!(count = self.state.books.len(), "reading list already initialized; not reloading");
            return;
        }
        self.initialized = true;

        self.state.books = self.store.load().await;
        info!(count = self.state.books.len(), "reading list loaded");
        self.notify(StateChange::Loaded {
            count: self.state.books.len(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    pub fn state(&self) -> &ReadingListState {
        &self.state
    }

    pub fn entries(&self) -> &[BookEntry] {
        &self.state.books
    }

    pub fn len(&self) -> usize {
        self.state.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.books.is_empty()
    }

    pub fn get(&self, id: &BookId) -> Option<&BookEntry> {
        self.state.books.iter().find(|entry| entry.id() == id)
    }

    /// Append a new unread entry.
    ///
    /// Either field being exactly empty makes this a silent no-op returning
    /// `None`. Whitespace-only text is accepted as-is.
    pub fn add(
        &mut self,
        book_name: impl Into<String>,
        author_name: impl Into<String>,
    ) -> Option<BookId> {
        let book_name = book_name.into();
        let author_name = author_name.into();

        if let Err(err) = validate(&book_name, &author_name) {
            debug!(error = %err, "ignoring add");
            return None;
        }

        let id = BookId::generate();
        self.state
            .books
            .push(BookEntry::new(id.clone(), book_name, author_name));
        self.state.book_name.clear();
        self.state.author_name.clear();
        self.state.is_adding = false;

        info!(book_id = %id, count = self.state.books.len(), "book added");
        self.notify(StateChange::Added(id.clone()));
        self.persist();
        Some(id)
    }

    /// Add using the dialog's input buffers.
    pub fn submit_add(&mut self) -> Option<BookId> {
        let book_name = self.state.book_name.clone();
        let author_name = self.state.author_name.clone();
        self.add(book_name, author_name)
    }

    /// Remove the entry with `id`. Returns `false` (and writes nothing) when absent.
    pub fn delete(&mut self, id: &BookId) -> bool {
        let Some(index) = self.state.books.iter().position(|entry| entry.id() == id) else {
            debug!(book_id = %id, "delete: no such book");
            return false;
        };

        self.state.books.remove(index);
        info!(book_id = %id, count = self.state.books.len(), "book deleted");
        self.notify(StateChange::Deleted(id.clone()));
        self.persist();
        true
    }

    /// Flip the read flag of `id`, returning the new value. `None` when absent.
    pub fn toggle_read(&mut self, id: &BookId) -> Option<bool> {
        let Some(entry) = self.state.books.iter_mut().find(|entry| entry.id() == id) else {
            debug!(book_id = %id, "toggle: no such book");
            return None;
        };

        let read = entry.toggle_read();
        info!(book_id = %id, read, "read status toggled");
        self.notify(StateChange::ReadToggled {
            id: id.clone(),
            read,
        });
        self.persist();
        Some(read)
    }

    /// Entries whose title or author contains `search_text`, ignoring case.
    /// Recomputed on every call.
    pub fn filtered_view(&self, search_text: &str) -> Vec<&BookEntry> {
        let needle = search_text.to_lowercase();
        self.state
            .books
            .iter()
            .filter(|entry| entry.matches_lowercase(&needle))
            .collect()
    }

    /// The filtered view for the current search text.
    pub fn visible_entries(&self) -> Vec<&BookEntry> {
        self.filtered_view(&self.state.search_text)
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
        self.notify(StateChange::SearchChanged);
    }

    pub fn open_add_dialog(&mut self) {
        self.state.is_adding = true;
        self.notify(StateChange::DialogOpened);
    }

    /// Cancel the dialog. Typed text is kept for the next time it opens.
    pub fn close_add_dialog(&mut self) {
        self.state.is_adding = false;
        self.notify(StateChange::DialogClosed);
    }

    pub fn set_book_name(&mut self, text: impl Into<String>) {
        self.state.book_name = text.into();
        self.notify(StateChange::DraftChanged);
    }

    pub fn set_author_name(&mut self, text: impl Into<String>) {
        self.state.author_name = text.into();
        self.notify(StateChange::DraftChanged);
    }

    /// Wait for every write queued so far to reach the store.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    /// Flush outstanding writes and stop the persistence worker.
    pub async fn shutdown(self) {
        self.persistence.shutdown().await;
    }

    fn persist(&mut self) {
        self.initialized = true;
        self.persistence.submit(self.state.books.clone());
    }

    fn notify(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

fn validate(book_name: &str, author_name: &str) -> Result<(), ReadingListError> {
    if book_name.is_empty() {
        return Err(ReadingListError::InvalidInput { field: "bookName" });
    }
    if author_name.is_empty() {
        return Err(ReadingListError::InvalidInput { field: "authorName" });
    }
    Ok(())
}
