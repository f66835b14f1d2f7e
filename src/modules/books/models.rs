use serde::{Deserialize, Serialize};

use crate::modules::authors::models::AuthorRef;
use crate::modules::genres::models::GenreRef;

/// Columns a book listing may be sorted by.
pub const SORTABLE_FIELDS: &[&str] = &["id", "title", "isbn"];

/// Persisted book with its associations resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Natural key, unique across the catalog
    pub isbn: String,
    pub authors: Vec<AuthorRef>,
    pub genres: Vec<GenreRef>,
}

/// Book as seen from an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub id: i64,
    pub title: String,
}

/// Book returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDto {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub authors: Vec<AuthorRef>,
    pub genres: Vec<GenreRef>,
}

/// Request model for creating a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub isbn: String,
    pub author_ids: Vec<i64>,
    pub genre_ids: Vec<i64>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>, author_ids: Vec<i64>, genre_ids: Vec<i64>) -> Self {
        Self {
            title: title.into(),
            isbn: isbn.into(),
            author_ids,
            genre_ids,
        }
    }
}

/// Partial update; absent fields keep their stored value. Association
/// lists, when present, replace the existing ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub author_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub genre_ids: Option<Vec<i64>>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            isbn: book.isbn,
            authors: book.authors,
            genres: book.genres,
        }
    }
}
