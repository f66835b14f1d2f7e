use bookshelf_db::Database;
use rusqlite::Connection;

use super::models::{BookDto, BookPatch, NewBook, SORTABLE_FIELDS};
use super::repository;
use crate::error::{CatalogError, CatalogResult, EntityKind, LookupKey};
use crate::modules::{authors, genres};
use crate::pagination::{PageQuery, Pager};

/// Business operations on books and their associations.
#[derive(Clone)]
pub struct BookService {
    db: Database,
    pager: Pager,
}

fn require_text(field: &'static str, value: &str) -> CatalogResult<()> {
    if value.trim().is_empty() {
        return Err(CatalogError::validation(field, "must not be blank"));
    }
    Ok(())
}

fn require_some(field: &'static str, ids: &[i64]) -> CatalogResult<()> {
    if ids.is_empty() {
        return Err(CatalogError::validation(field, "at least one is required"));
    }
    Ok(())
}

fn ensure_authors_exist(conn: &Connection, ids: &[i64]) -> CatalogResult<()> {
    for &id in ids {
        if !authors::repository::exists(conn, id)? {
            return Err(CatalogError::missing_id(EntityKind::Author, id));
        }
    }
    Ok(())
}

fn ensure_genres_exist(conn: &Connection, ids: &[i64]) -> CatalogResult<()> {
    for &id in ids {
        if !genres::repository::exists(conn, id)? {
            return Err(CatalogError::missing_id(EntityKind::Genre, id));
        }
    }
    Ok(())
}

/// Fail with `DuplicateIsbn` when another book already holds `isbn`.
fn ensure_isbn_available(conn: &Connection, isbn: &str, exclude: Option<i64>) -> CatalogResult<()> {
    match repository::isbn_owner(conn, isbn)? {
        Some(owner) if Some(owner) != exclude => Err(CatalogError::DuplicateIsbn {
            isbn: isbn.to_string(),
        }),
        _ => Ok(()),
    }
}

impl BookService {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self { db, pager }
    }

    pub fn get_by_id(&self, id: i64) -> CatalogResult<BookDto> {
        self.db.read(|conn| {
            repository::find_by_id(conn, id)?
                .map(BookDto::from)
                .ok_or_else(|| CatalogError::missing_id(EntityKind::Book, id))
        })
    }

    pub fn get_by_isbn(&self, isbn: &str) -> CatalogResult<BookDto> {
        self.db.read(|conn| {
            repository::find_by_isbn(conn, isbn)?
                .map(BookDto::from)
                .ok_or_else(|| {
                    CatalogError::not_found(EntityKind::Book, LookupKey::Isbn(isbn.to_string()))
                })
        })
    }

    pub fn get_by_title(&self, title: &str) -> CatalogResult<BookDto> {
        self.db.read(|conn| {
            repository::find_by_title(conn, title)?
                .map(BookDto::from)
                .ok_or_else(|| {
                    CatalogError::not_found(EntityKind::Book, LookupKey::Title(title.to_string()))
                })
        })
    }

    pub fn search_by_first_letter(&self, letter: char) -> CatalogResult<Vec<String>> {
        self.db
            .read(|conn| Ok(repository::titles_starting_with(conn, letter)?))
    }

    /// Books tagged with the genre named `genre`, by title. An unknown
    /// genre yields an empty list rather than `NotFound`.
    pub fn get_all_by_genre(&self, genre: &str) -> CatalogResult<Vec<BookDto>> {
        self.db.read(|conn| {
            Ok(repository::find_by_genre_name(conn, genre)?
                .into_iter()
                .map(BookDto::from)
                .collect())
        })
    }

    pub fn get_all(&self) -> CatalogResult<Vec<BookDto>> {
        self.db.read(|conn| {
            Ok(repository::find_all(conn)?
                .into_iter()
                .map(BookDto::from)
                .collect())
        })
    }

    pub fn get_all_by_id(&self, ids: &[i64]) -> CatalogResult<Vec<BookDto>> {
        ids.iter().map(|&id| self.get_by_id(id)).collect()
    }

    pub fn get_page(&self, query: &PageQuery) -> CatalogResult<Vec<BookDto>> {
        let page = self
            .pager
            .resolve(query, EntityKind::Book, SORTABLE_FIELDS)?;
        self.db.read(|conn| {
            Ok(repository::find_page(conn, &page)?
                .into_iter()
                .map(BookDto::from)
                .collect())
        })
    }

    pub fn save(&self, book: &NewBook) -> CatalogResult<i64> {
        require_text("title", &book.title)?;
        require_text("isbn", &book.isbn)?;
        require_some("authorIds", &book.author_ids)?;
        require_some("genreIds", &book.genre_ids)?;

        let id = self.db.write(|tx| -> CatalogResult<i64> {
            ensure_isbn_available(tx, &book.isbn, None)?;
            ensure_authors_exist(tx, &book.author_ids)?;
            ensure_genres_exist(tx, &book.genre_ids)?;

            let id = repository::insert(tx, &book.title, &book.isbn)?;
            repository::replace_authors(tx, id, &book.author_ids)?;
            repository::replace_genres(tx, id, &book.genre_ids)?;
            Ok(id)
        })?;

        tracing::debug!(entity = "book", id, isbn = %book.isbn, "book saved");
        Ok(id)
    }

    /// Saves each book in turn. Earlier saves stay committed when a later
    /// one fails.
    pub fn save_all(&self, books: &[NewBook]) -> CatalogResult<Vec<i64>> {
        books.iter().map(|book| self.save(book)).collect()
    }

    /// Apply the fields present in `patch` to the stored book.
    pub fn update(&self, id: i64, patch: &BookPatch) -> CatalogResult<()> {
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }
        if let Some(isbn) = &patch.isbn {
            require_text("isbn", isbn)?;
        }
        if let Some(author_ids) = &patch.author_ids {
            require_some("authorIds", author_ids)?;
        }
        if let Some(genre_ids) = &patch.genre_ids {
            require_some("genreIds", genre_ids)?;
        }

        self.db.write(|tx| -> CatalogResult<()> {
            if let Some(isbn) = &patch.isbn {
                ensure_isbn_available(tx, isbn, Some(id))?;
            }

            let existing = repository::find_by_id(tx, id)?
                .ok_or_else(|| CatalogError::missing_id(EntityKind::Book, id))?;

            let title = patch.title.as_deref().unwrap_or(&existing.title);
            let isbn = patch.isbn.as_deref().unwrap_or(&existing.isbn);
            repository::update_fields(tx, id, title, isbn)?;

            if let Some(author_ids) = &patch.author_ids {
                ensure_authors_exist(tx, author_ids)?;
                repository::replace_authors(tx, id, author_ids)?;
            }
            if let Some(genre_ids) = &patch.genre_ids {
                ensure_genres_exist(tx, genre_ids)?;
                repository::replace_genres(tx, id, genre_ids)?;
            }
            Ok(())
        })?;

        tracing::debug!(entity = "book", id, "book updated");
        Ok(())
    }

    pub fn delete(&self, id: i64) -> CatalogResult<()> {
        self.db.write(|tx| -> CatalogResult<()> {
            if !repository::delete(tx, id)? {
                return Err(CatalogError::missing_id(EntityKind::Book, id));
            }
            Ok(())
        })?;

        tracing::debug!(entity = "book", id, "book deleted");
        Ok(())
    }
}
