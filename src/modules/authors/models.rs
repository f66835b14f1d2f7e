use serde::{Deserialize, Serialize};

use crate::modules::books::models::BookRef;

/// Columns an author listing may be sorted by.
pub const SORTABLE_FIELDS: &[&str] = &["id", "name"];

/// Persisted author together with the books it is credited on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    /// In association order.
    pub books: Vec<BookRef>,
}

/// Author as seen from a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: i64,
    pub name: String,
}

/// Author returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDto {
    pub id: i64,
    pub name: String,
    /// Titles of the author's books
    pub books: Vec<String>,
}

/// Request body for creating or renaming an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
}

impl AuthorInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            books: author.books.into_iter().map(|book| book.title).collect(),
        }
    }
}
