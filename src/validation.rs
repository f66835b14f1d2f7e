//! Case-insensitive name uniqueness for authors and genres.
//!
//! The check scans every stored name and compares it to the candidate
//! ignoring case. Callers run it inside the same write transaction as the
//! insert or update it guards, which makes check-then-write atomic. The
//! `NOCASE` unique indexes on both tables back this up at the store level.

use rusqlite::Connection;

use crate::error::{CatalogError, CatalogResult, EntityKind};

/// Entities whose `name` column must be unique ignoring case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedEntity {
    Author,
    Genre,
}

impl NamedEntity {
    fn table(self) -> &'static str {
        match self {
            NamedEntity::Author => "authors",
            NamedEntity::Genre => "genres",
        }
    }

    pub fn kind(self) -> EntityKind {
        match self {
            NamedEntity::Author => EntityKind::Author,
            NamedEntity::Genre => EntityKind::Genre,
        }
    }
}

/// Unicode-aware case-insensitive equality.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Whether `candidate` collides with a stored name. The row with id
/// `exclude` is skipped, so an entity never collides with itself.
pub fn is_name_taken(
    conn: &Connection,
    entity: NamedEntity,
    candidate: &str,
    exclude: Option<i64>,
) -> anyhow::Result<bool> {
    let mut stmt = conn.prepare_cached(&format!("SELECT id, name FROM {}", entity.table()))?;
    let mut rows = stmt.query([])?;

    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        if Some(id) == exclude {
            continue;
        }
        let name: String = row.get(1)?;
        if eq_ignore_case(&name, candidate) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Fail with `DuplicateName` when `candidate` is already taken.
pub fn ensure_name_available(
    conn: &Connection,
    entity: NamedEntity,
    candidate: &str,
    exclude: Option<i64>,
) -> CatalogResult<()> {
    if is_name_taken(conn, entity, candidate, exclude)? {
        return Err(CatalogError::DuplicateName {
            entity: entity.kind(),
            name: candidate.to_string(),
        });
    }
    Ok(())
}

/// Names must contain something other than whitespace.
pub fn require_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::validation("name", "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn_with_authors(names: &[&str]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE authors (id INTEGER PRIMARY KEY, name TEXT NOT NULL);")
            .unwrap();
        for name in names {
            conn.execute("INSERT INTO authors (name) VALUES (?1)", [name])
                .unwrap();
        }
        conn
    }

    #[test]
    fn comparison_ignores_case() {
        assert!(eq_ignore_case("Tolkien", "TOLKIEN"));
        assert!(eq_ignore_case("Ørsted", "ørsted"));
        assert!(!eq_ignore_case("Tolkien", "Tolkien "));
    }

    #[test]
    fn taken_name_is_detected_in_any_case() {
        let conn = conn_with_authors(&["Tolkien", "Le Guin"]);
        assert!(is_name_taken(&conn, NamedEntity::Author, "TOLKIEN", None).unwrap());
        assert!(is_name_taken(&conn, NamedEntity::Author, "le guin", None).unwrap());
        assert!(!is_name_taken(&conn, NamedEntity::Author, "Pratchett", None).unwrap());
    }

    #[test]
    fn excluded_row_does_not_collide_with_itself() {
        let conn = conn_with_authors(&["Tolkien"]);
        assert!(!is_name_taken(&conn, NamedEntity::Author, "tolkien", Some(1)).unwrap());
        assert!(is_name_taken(&conn, NamedEntity::Author, "tolkien", Some(2)).unwrap());
    }

    #[test]
    fn duplicate_carries_name_and_entity() {
        let conn = conn_with_authors(&["Tolkien"]);
        match ensure_name_available(&conn, NamedEntity::Author, "TOLKIEN", None) {
            Err(CatalogError::DuplicateName { entity, name }) => {
                assert_eq!(entity, EntityKind::Author);
                assert_eq!(name, "TOLKIEN");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(require_name("  ").is_err());
        assert!(require_name("Fantasy").is_ok());
    }
}
