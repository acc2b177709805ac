use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a book entry.
///
/// Older installs stored millisecond timestamps rendered as strings, so any
/// string is accepted when loading. Fresh ids are UUIDv7 strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(String);

impl BookId {
    /// Generate a new time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One tracked book. Only the read flag changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookEntry {
    id: BookId,
    book_name: String,
    author_name: String,
    #[serde(default)]
    read: bool,
}

impl BookEntry {
    pub(crate) fn new(id: BookId, book_name: String, author_name: String) -> Self {
        Self {
            id,
            book_name,
            author_name,
            read: false,
        }
    }

    pub fn id(&self) -> &BookId {
        &self.id
    }

    /// Title of the book
    pub fn book_name(&self) -> &str {
        &self.book_name
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn is_read(&self) -> bool {
        self.read
    }

    pub(crate) fn toggle_read(&mut self) -> bool {
        self.read = !self.read;
        self.read
    }

    /// Case-insensitive substring match on title or author.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.book_name.to_lowercase().contains(needle)
            || self.author_name.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_fields() {
        let entry = BookEntry::new("1700000000000".into(), "Dune".into(), "Herbert".into());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1700000000000",
                "bookName": "Dune",
                "authorName": "Herbert",
                "read": false
            })
        );
    }

    #[test]
    fn tolerates_unknown_fields_and_missing_read_flag() {
        let entry: BookEntry = serde_json::from_value(json!({
            "id": "a",
            "bookName": "Emma",
            "authorName": "Austen",
            "rating": 5
        }))
        .unwrap();
        assert_eq!(entry.id().as_str(), "a");
        assert!(!entry.is_read());
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = BookId::generate();
        let b = BookId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn matching_covers_title_and_author() {
        let entry = BookEntry::new("x".into(), "Dune".into(), "Frank Herbert".into());
        assert!(entry.matches_lowercase(""));
        assert!(entry.matches_lowercase("dun"));
        assert!(entry.matches_lowercase("herb"));
        assert!(!entry.matches_lowercase("asimov"));
    }
}
