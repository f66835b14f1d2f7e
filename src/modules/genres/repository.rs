use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::Genre;
use crate::pagination::PageRequest;

fn query(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Genre>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let genres = stmt
        .query_map(params, |r| {
            Ok(Genre {
                id: r.get(0)?,
                name: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(genres)
}

pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<Genre>> {
    Ok(query(conn, "SELECT id, name FROM genres WHERE id = ?1", params![id])?.pop())
}

pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Genre>> {
    Ok(query(
        conn,
        "SELECT id, name FROM genres WHERE name = ?1 ORDER BY id LIMIT 1",
        params![name],
    )?
    .pop())
}

pub fn find_all(conn: &Connection) -> Result<Vec<Genre>> {
    query(conn, "SELECT id, name FROM genres ORDER BY id", [])
}

pub fn find_page(conn: &Connection, page: &PageRequest) -> Result<Vec<Genre>> {
    let sql = format!(
        "SELECT id, name FROM genres ORDER BY {} LIMIT ?1 OFFSET ?2",
        page.order_by()
    );
    query(conn, &sql, params![page.limit(), page.offset()])
}

pub fn names_starting_with(conn: &Connection, letter: char) -> Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT name FROM genres WHERE substr(name, 1, 1) = ?1 ORDER BY name, id",
    )?;
    let names = stmt
        .query_map(params![letter.to_string()], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

pub fn exists(conn: &Connection, id: i64) -> Result<bool> {
    Ok(conn
        .query_row("SELECT 1 FROM genres WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some())
}

pub fn insert(conn: &Connection, name: &str) -> Result<i64> {
    conn.execute("INSERT INTO genres (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

pub fn update_name(conn: &Connection, id: i64, name: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE genres SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(changed > 0)
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn.execute("DELETE FROM genres WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}
