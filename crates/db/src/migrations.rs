use anyhow::Context;
use bookshelf_kernel::Migration;
use rusqlite::{params, Connection};

use crate::Database;

const CREATE_LEDGER: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    module TEXT NOT NULL,
    id TEXT NOT NULL,
    applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now')),
    PRIMARY KEY (module, id)
);";

fn is_applied(conn: &Connection, module: &str, id: &str) -> anyhow::Result<bool> {
    let found: i64 = conn.query_row(
        "SELECT COUNT(*) FROM schema_migrations WHERE module = ?1 AND id = ?2",
        params![module, id],
        |r| r.get(0),
    )?;
    Ok(found > 0)
}

impl Database {
    /// Apply every migration not yet recorded in `schema_migrations`.
    ///
    /// Each migration runs in its own transaction together with its ledger
    /// row, so a failing script leaves no partial schema behind. Returns the
    /// number of migrations applied by this call.
    pub fn migrate(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        self.write(|tx| {
            tx.execute_batch(CREATE_LEDGER)
                .context("failed to create migration ledger")
        })?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let ran = self.write(|tx| -> anyhow::Result<bool> {
                if is_applied(tx, module, migration.id)? {
                    return Ok(false);
                }

                tx.execute_batch(migration.up).with_context(|| {
                    format!("migration {}/{} failed", module, migration.id)
                })?;
                tx.execute(
                    "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
                    params![module, migration.id],
                )?;
                Ok(true)
            })?;

            if ran {
                tracing::info!(
                    target: "bookshelf-db",
                    module = %module,
                    migration = migration.id,
                    "migration applied"
                );
                applied += 1;
            }
        }

        Ok(applied)
    }
}
