//! Booklist application library
//!
//! A personal reading list held in memory and mirrored to a local key-value
//! store after every change.

pub mod modules;
pub mod screen;

/// Re-export commonly used types
pub use modules::books::{
    open_reading_list, BookEntry, BookId, BookStore, ReadingListController, ReadingListError,
    ReadingListState, StateChange,
};
