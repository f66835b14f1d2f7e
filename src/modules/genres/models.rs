use serde::{Deserialize, Serialize};

pub const SORTABLE_FIELDS: &[&str] = &["id", "name"];

/// Persisted genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Genre as seen from a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDto {
    pub id: i64,
    pub name: String,
}

/// Request body for creating or renaming a genre.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl GenreInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<Genre> for GenreDto {
    fn from(genre: Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}
