//! Failure taxonomy of the catalog and its mapping onto HTTP responses.

use std::fmt;

use bookshelf_http::error::AppError;
use serde_json::json;
use thiserror::Error;

/// The three aggregates the catalog manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Book,
    Author,
    Genre,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Book => "book",
            EntityKind::Author => "author",
            EntityKind::Genre => "genre",
        })
    }
}

/// How a missing entity was looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Id(i64),
    Name(String),
    Isbn(String),
    Title(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Id(id) => write!(f, "id {id}"),
            LookupKey::Name(name) => write!(f, "name '{name}'"),
            LookupKey::Isbn(isbn) => write!(f, "isbn '{isbn}'"),
            LookupKey::Title(title) => write!(f, "title '{title}'"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} with {key} does not exist")]
    NotFound { entity: EntityKind, key: LookupKey },

    #[error("{entity} named '{name}' already exists")]
    DuplicateName { entity: EntityKind, name: String },

    #[error("book with isbn '{isbn}' already exists")]
    DuplicateIsbn { isbn: String },

    #[error("invalid page request: {reason}")]
    InvalidPageRequest { reason: String },

    #[error("{entity} cannot be sorted by '{field}'")]
    InvalidSortField { entity: EntityKind, field: String },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: EntityKind, key: LookupKey) -> Self {
        Self::NotFound { entity, key }
    }

    pub fn missing_id(entity: EntityKind, id: i64) -> Self {
        Self::not_found(entity, LookupKey::Id(id))
    }

    pub fn invalid_page(reason: impl Into<String>) -> Self {
        Self::InvalidPageRequest {
            reason: reason.into(),
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        CatalogError::Storage(err.into())
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound { .. } => AppError::not_found(message),
            CatalogError::DuplicateName { entity, name } => AppError::conflict(
                vec![json!({"entity": entity.to_string(), "field": "name", "value": name})],
                message,
            ),
            CatalogError::DuplicateIsbn { isbn } => AppError::conflict(
                vec![json!({"entity": "book", "field": "isbn", "value": isbn})],
                message,
            ),
            CatalogError::InvalidPageRequest { .. } | CatalogError::InvalidSortField { .. } => {
                AppError::bad_request(message)
            }
            CatalogError::Validation { field, reason } => {
                AppError::validation(vec![json!({"field": field, "error": reason})], message)
            }
            CatalogError::Storage(source) => AppError::Internal(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn messages_name_entity_and_key() {
        let err = CatalogError::missing_id(EntityKind::Author, 7);
        assert_eq!(err.to_string(), "author with id 7 does not exist");

        let err = CatalogError::not_found(EntityKind::Book, LookupKey::Isbn("978-0".into()));
        assert_eq!(err.to_string(), "book with isbn '978-0' does not exist");
    }

    #[test]
    fn catalog_errors_map_to_client_statuses() {
        let cases = [
            (CatalogError::missing_id(EntityKind::Genre, 1), StatusCode::NOT_FOUND),
            (
                CatalogError::DuplicateName {
                    entity: EntityKind::Author,
                    name: "Tolkien".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                CatalogError::DuplicateIsbn {
                    isbn: "1".into(),
                },
                StatusCode::CONFLICT,
            ),
            (CatalogError::invalid_page("page size must be at least 1"), StatusCode::BAD_REQUEST),
            (
                CatalogError::InvalidSortField {
                    entity: EntityKind::Book,
                    field: "price".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                CatalogError::validation("title", "must not be blank"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CatalogError::Storage(anyhow::anyhow!("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }
}
