//! Assembles the storage handle, the module registry and the HTTP surface.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_db::{Database, DatabaseModule};
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use crate::modules;
use crate::pagination::Pager;

/// A fully wired catalog application.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Open the configured database and register every module.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::open(&settings.database)
            .with_context(|| format!("failed to open database at {}", settings.database.path))?;
        Ok(Self::with_database(settings, db))
    }

    /// Wire the application around an already opened database.
    pub fn with_database(settings: Settings, db: Database) -> Self {
        let mut registry = ModuleRegistry::new();
        registry.register_core(Arc::new(DatabaseModule::new(db.clone())));
        modules::register_all(&mut registry, &db, Pager::from_settings(&settings.pagination));

        tracing::info!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "modules registered"
        );

        Self {
            settings,
            db,
            registry,
        }
    }

    /// In-memory application with the schema in place.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let mut settings = Settings::default();
        settings.database.path = bookshelf_kernel::settings::DatabaseSettings::IN_MEMORY.to_string();
        let app = Self::with_database(settings, Database::open_in_memory()?);
        app.prepare().await?;
        Ok(app)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Apply pending migrations; returns how many ran.
    pub fn migrate(&self) -> anyhow::Result<usize> {
        let applied = self
            .db
            .migrate(&self.registry.collect_migrations())
            .context("failed to apply migrations")?;
        tracing::info!(applied, location = self.db.location(), "migrations complete");
        Ok(applied)
    }

    /// Initialize every module, then bring the schema up to date.
    pub async fn prepare(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_all(&ctx).await?;
        self.migrate()?;
        Ok(())
    }

    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Prepare, start the modules and serve HTTP until shutdown.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.prepare().await?;

        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.start_all(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;

        self.registry.stop_all().await?;
        served
    }
}
