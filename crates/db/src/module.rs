use async_trait::async_trait;
use bookshelf_kernel::{InitCtx, Module};

use crate::Database;

/// Core module that owns the storage handle's lifecycle.
pub struct DatabaseModule {
    db: Database,
}

impl DatabaseModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let version = self.db.sqlite_version()?;
        tracing::info!(
            module = self.name(),
            location = self.db.location(),
            sqlite = %version,
            "database module initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.db.read(|conn| {
            conn.execute_batch("PRAGMA optimize;")
                .map_err(anyhow::Error::from)
        })?;
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::settings::Settings;

    #[tokio::test]
    async fn module_lifecycle_touches_the_database() {
        let module = DatabaseModule::new(Database::open_in_memory().unwrap());
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert_eq!(module.name(), "db");
    }
}
