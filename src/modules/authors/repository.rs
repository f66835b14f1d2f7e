//! SQL for the `authors` table and its side of `book_author`.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Author, AuthorRef};
use crate::modules::books::models::BookRef;
use crate::pagination::PageRequest;

fn book_refs(conn: &Connection, author_id: i64) -> Result<Vec<BookRef>> {
    let mut stmt = conn.prepare_cached(
        "SELECT b.id, b.title FROM book_author ba
         JOIN books b ON b.id = ba.book_id
         WHERE ba.author_id = ?1
         ORDER BY ba.rowid",
    )?;
    let books = stmt
        .query_map(params![author_id], |r| {
            Ok(BookRef {
                id: r.get(0)?,
                title: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

fn hydrate(conn: &Connection, rows: Vec<AuthorRef>) -> Result<Vec<Author>> {
    rows.into_iter()
        .map(|row| -> Result<Author> {
            Ok(Author {
                books: book_refs(conn, row.id)?,
                id: row.id,
                name: row.name,
            })
        })
        .collect()
}

fn query_refs(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<AuthorRef>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt
        .query_map(params, |r| {
            Ok(AuthorRef {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Author>> {
    let rows = query_refs(conn, "SELECT id, name FROM authors WHERE id = ?1", params![id])?;
    Ok(hydrate(conn, rows)?.pop())
}

/// Exact, case-sensitive name match.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Author>> {
    let rows = query_refs(
        conn,
        "SELECT id, name FROM authors WHERE name = ?1 ORDER BY id LIMIT 1",
        params![name],
    )?;
    Ok(hydrate(conn, rows)?.pop())
}

pub fn find_all(conn: &Connection) -> Result<Vec<Author>> {
    let rows = query_refs(conn, "SELECT id, name FROM authors ORDER BY id", [])?;
    hydrate(conn, rows)
}

pub fn find_page(conn: &Connection, page: &PageRequest) -> Result<Vec<Author>> {
    let sql = format!(
        "SELECT id, name FROM authors ORDER BY {} LIMIT ?1 OFFSET ?2",
        page.order_by()
    );
    let rows = query_refs(conn, &sql, params![page.limit(), page.offset()])?;
    hydrate(conn, rows)
}

/// Names whose first character is `letter`, case-sensitive, in binary order.
pub fn names_starting_with(conn: &Connection, letter: char) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT name FROM authors WHERE substr(name, 1, 1) = ?1 ORDER BY name, id",
    )?;
    let names = stmt
        .query_map(params![letter.to_string()], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn count_books(conn: &Connection, id: i64) -> Result<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM book_author WHERE author_id = ?1",
        params![id],
        |r| r.get(0),
    )?;
    Ok(usize::try_from(count)?)
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM authors WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn insert(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO authors (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn update_name(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE authors SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(changed > 0)
}

/// Join rows go with the author through `ON DELETE CASCADE`; books stay.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM authors WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
