//! Errors raised inside the reading list.
//!
//! None of these reach the rendering surface: the controller logs them and
//! carries on with its in-memory state.

use booklist_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadingListError {
    #[error("failed to read stored books: {0}")]
    StoreRead(#[source] StoreError),

    #[error("stored books are not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode books as JSON: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write books to the store: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("invalid input: {field} must not be empty")]
    InvalidInput { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_names_the_field() {
        let err = ReadingListError::InvalidInput { field: "bookName" };
        assert_eq!(err.to_string(), "invalid input: bookName must not be empty");
    }

    #[test]
    fn write_errors_say_so() {
        let err = ReadingListError::StoreWrite(StoreError::Backend("disk full".into()));
        assert_eq!(
            err.to_string(),
            "failed to write books to the store: store backend error: disk full"
        );
    }
}
