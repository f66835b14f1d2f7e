//! SQL for `books` and the two join tables it owns.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Book;
use crate::modules::authors::models::AuthorRef;
use crate::modules::genres::models::GenreRef;
use crate::pagination::PageRequest;

const COLUMNS: &str = "b.id, b.title, b.isbn";

struct BookRow {
    id: i64,
    title: String,
    isbn: String,
}

fn rows(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<BookRow>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, |r| {
            Ok(BookRow {
                id: r.get(0)?,
                title: r.get(1)?,
                isbn: r.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn authors_of(conn: &Connection, book_id: i64) -> Result<Vec<AuthorRef>> {
    let mut stmt = conn.prepare_cached(
        "SELECT a.id, a.name FROM book_author ba
         JOIN authors a ON a.id = ba.author_id
         WHERE ba.book_id = ?1
         ORDER BY ba.rowid",
    )?;
    let authors = stmt
        .query_map(params![book_id], |r| {
            Ok(AuthorRef {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(authors)
}

fn genres_of(conn: &Connection, book_id: i64) -> Result<Vec<GenreRef>> {
    let mut stmt = conn.prepare_cached(
        "SELECT g.id, g.name FROM book_genre bg
         JOIN genres g ON g.id = bg.genre_id
         WHERE bg.book_id = ?1
         ORDER BY bg.rowid",
    )?;
    let genres = stmt
        .query_map(params![book_id], |r| {
            Ok(GenreRef {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(genres)
}

fn hydrate(conn: &Connection, rows: Vec<BookRow>) -> Result<Vec<Book>> {
    rows.into_iter()
        .map(|row| -> Result<Book> {
            Ok(Book {
                authors: authors_of(conn, row.id)?,
                genres: genres_of(conn, row.id)?,
                id: row.id,
                title: row.title,
                isbn: row.isbn,
            })
        })
        .collect()
}

fn find_one(conn: &Connection, filter: &str, value: impl rusqlite::ToSql) -> Result<Option<Book>> {
    let sql = format!("SELECT {COLUMNS} FROM books b WHERE {filter} ORDER BY b.id LIMIT 1");
    let found = rows(conn, &sql, params![value])?;
    Ok(hydrate(conn, found)?.pop())
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Book>> {
    find_one(conn, "b.id = ?1", id)
}

pub fn find_by_isbn(conn: &Connection, isbn: &str) -> Result<Option<Book>> {
    find_one(conn, "b.isbn = ?1", isbn)
}

/// Titles are not unique; the oldest book with the title wins.
pub fn find_by_title(conn: &Connection, title: &str) -> Result<Option<Book>> {
    find_one(conn, "b.title = ?1", title)
}

pub fn find_all(conn: &Connection) -> Result<Vec<Book>> {
    let found = rows(conn, &format!("SELECT {COLUMNS} FROM books b ORDER BY b.id"), [])?;
    hydrate(conn, found)
}

pub fn find_page(conn: &Connection, page: &PageRequest) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM books b ORDER BY {} LIMIT ?1 OFFSET ?2",
        page.order_by()
    );
    let found = rows(conn, &sql, params![page.limit(), page.offset()])?;
    hydrate(conn, found)
}

pub fn titles_starting_with(conn: &Connection, letter: char) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT title FROM books WHERE substr(title, 1, 1) = ?1 ORDER BY title, id",
    )?;
    let titles = stmt
        .query_map(params![letter.to_string()], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(titles)
}

/// Books joined to the genre named exactly `genre`, by title. An unknown
/// genre simply matches nothing.
pub fn find_by_genre_name(conn: &Connection, genre: &str) -> Result<Vec<Book>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM books b
         JOIN book_genre bg ON bg.book_id = b.id
         JOIN genres g ON g.id = bg.genre_id
         WHERE g.name = ?1
         ORDER BY b.title, b.id"
    );
    let found = rows(conn, &sql, params![genre])?;
    hydrate(conn, found)
}

/// Id of the book currently holding `isbn`.
pub fn isbn_owner(conn: &Connection, isbn: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM books WHERE isbn = ?1", params![isbn], |r| r.get(0))
        .optional()?)
}

pub fn insert(conn: &Connection, title: &str, isbn: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO books (title, isbn) VALUES (?1, ?2)",
        params![title, isbn],
    )
    .context("failed to insert book")?;
    Ok(conn.last_insert_rowid())
}

pub fn update_fields(conn: &Connection, id: i64, title: &str, isbn: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE books SET title = ?1, isbn = ?2 WHERE id = ?3",
        params![title, isbn, id],
    )?;
    Ok(changed > 0)
}

/// Replace the book's authors, keeping the given order. Repeated ids
/// collapse to one association.
pub fn replace_authors(conn: &Connection, book_id: i64, author_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM book_author WHERE book_id = ?1", params![book_id])?;
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO book_author (book_id, author_id) VALUES (?1, ?2)",
    )?;
    for author_id in author_ids {
        stmt.execute(params![book_id, author_id])?;
    }
    Ok(())
}

pub fn replace_genres(conn: &Connection, book_id: i64, genre_ids: &[i64]) -> Result<()> {
    conn.execute("DELETE FROM book_genre WHERE book_id = ?1", params![book_id])?;
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO book_genre (book_id, genre_id) VALUES (?1, ?2)",
    )?;
    for genre_id in genre_ids {
        stmt.execute(params![book_id, genre_id])?;
    }
    Ok(())
}

/// Join rows go with the book through `ON DELETE CASCADE`.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
