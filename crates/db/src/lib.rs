//! SQLite persistence for the bookshelf service.
//!
//! A single connection sits behind a mutex, so there is exactly one writer
//! at a time. Writes go through [`Database::write`], which wraps the closure
//! in an `IMMEDIATE` transaction: a check-then-insert performed inside one
//! call cannot interleave with another writer.

mod migrations;
mod module;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context};
use bookshelf_kernel::settings::DatabaseSettings;
use rusqlite::{Connection, Transaction, TransactionBehavior};

pub use module::DatabaseModule;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    location: String,
}

impl Database {
    /// Open (or create) the database described by `settings`.
    pub fn open(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        if settings.is_in_memory() {
            return Self::open_in_memory();
        }

        let conn = Connection::open_with_flags(
            &settings.path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database at {}", settings.path))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))?;

        Self::from_connection(conn, settings.path.clone())
    }

    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn, DatabaseSettings::IN_MEMORY.to_string())
    }

    fn from_connection(conn: Connection, location: String) -> anyhow::Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .context("failed to enable foreign keys")?;

        tracing::info!(target: "bookshelf-db", %location, "database opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            location,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Run read-only work against the connection.
    ///
    /// Runs on the caller's thread, async handlers included; statements are
    /// short and the store has a single connection.
    pub fn read<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside an `IMMEDIATE` transaction. The transaction commits
    /// when `f` succeeds and rolls back when it returns an error.
    pub fn write<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<anyhow::Error>,
    {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .context("failed to begin transaction")?;

        let value = f(&tx)?;

        tx.commit().context("failed to commit transaction")?;
        Ok(value)
    }

    /// Version string of the linked SQLite library.
    pub fn sqlite_version(&self) -> anyhow::Result<String> {
        self.read(|conn| {
            conn.query_row("SELECT sqlite_version()", [], |row| row.get(0))
                .context("failed to query sqlite version")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_table(db: &Database) {
        db.write(|tx| {
            tx.execute_batch("CREATE TABLE scratch (id INTEGER PRIMARY KEY, value TEXT NOT NULL);")
                .map_err(anyhow::Error::from)
        })
        .unwrap();
    }

    fn count(db: &Database) -> i64 {
        db.read(|conn| {
            conn.query_row("SELECT COUNT(*) FROM scratch", [], |r| r.get(0))
                .map_err(anyhow::Error::from)
        })
        .unwrap()
    }

    #[test]
    fn write_commits_on_success() {
        let db = Database::open_in_memory().unwrap();
        scratch_table(&db);

        db.write(|tx| {
            tx.execute("INSERT INTO scratch (value) VALUES ('a')", [])
                .map_err(anyhow::Error::from)
        })
        .unwrap();

        assert_eq!(count(&db), 1);
    }

    #[test]
    fn write_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        scratch_table(&db);

        let result = db.write(|tx| -> anyhow::Result<()> {
            tx.execute("INSERT INTO scratch (value) VALUES ('a')", [])?;
            Err(anyhow!("abort"))
        });

        assert!(result.is_err());
        assert_eq!(count(&db), 0);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .read(|conn| {
                conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))
                    .map_err(anyhow::Error::from)
            })
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let settings = DatabaseSettings {
            path: dir.path().join("shelf.db").to_string_lossy().into_owned(),
            ..DatabaseSettings::default()
        };

        {
            let db = Database::open(&settings).unwrap();
            scratch_table(&db);
            db.write(|tx| {
                tx.execute("INSERT INTO scratch (value) VALUES ('kept')", [])
                    .map_err(anyhow::Error::from)
            })
            .unwrap();
        }

        let db = Database::open(&settings).unwrap();
        assert_eq!(count(&db), 1);
        assert_eq!(db.location(), settings.path);
    }
}
