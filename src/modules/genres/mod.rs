pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use bookshelf_db::Database;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use crate::pagination::Pager;
use crate::utils::{self, openapi::*};
use service::GenreService;

pub struct GenresModule {
    service: GenreService,
}

impl GenresModule {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self {
            service: GenreService::new(db, pager),
        }
    }
}

#[async_trait]
impl Module for GenresModule {
    fn name(&self) -> &'static str {
        "genres"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            "genres module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Genres";
        let genre = || schema_ref("Genre");
        let id = || path_param("id", "integer");

        Some(json!({
            "paths": {
                "/": {
                    "get": Operation::new("List genres", tag)
                        .response("200", json_response("All genres by id", array_of(genre())))
                        .build(),
                    "post": Operation::new("Create genre", tag)
                        .body(schema_ref("GenreInput"))
                        .response("201", json_response("Created genre", genre()))
                        .response("409", error_response("Name already taken"))
                        .response("422", error_response("Blank name"))
                        .build()
                },
                "/page": {
                    "get": Operation::new("Page through genres", tag)
                        .params(page_params())
                        .response("200", json_response("One page of genres", array_of(genre())))
                        .response("400", error_response("Invalid page or sort"))
                        .build()
                },
                "/name": {
                    "get": Operation::new("Genre names by first letter", tag)
                        .params(vec![query_param("firstLetter", "string", true)])
                        .response("200", json_response("Matching names", array_of(json!({"type": "string"}))))
                        .build()
                },
                "/batch": {
                    "post": Operation::new("Create several genres", tag)
                        .body(array_of(schema_ref("GenreInput")))
                        .response("201", json_response("Identifiers", array_of(json!({"type": "integer"}))))
                        .response("409", error_response("Name already taken"))
                        .build()
                },
                "/lookup": {
                    "post": Operation::new("Fetch genres by id", tag)
                        .body(array_of(json!({"type": "integer"})))
                        .response("200", json_response("Genres in request order", array_of(genre())))
                        .response("404", error_response("Unknown id"))
                        .build()
                },
                "/by-name/{name}": {
                    "get": Operation::new("Get genre by exact name", tag)
                        .params(vec![path_param("name", "string")])
                        .response("200", json_response("Genre", genre()))
                        .response("404", error_response("Unknown name"))
                        .build()
                },
                "/{id}": {
                    "get": Operation::new("Get genre", tag)
                        .params(vec![id()])
                        .response("200", json_response("Genre", genre()))
                        .response("404", error_response("Unknown id"))
                        .build(),
                    "patch": Operation::new("Rename genre", tag)
                        .params(vec![id()])
                        .body(schema_ref("GenreInput"))
                        .response("200", json_response("Updated genre", genre()))
                        .response("404", error_response("Unknown id"))
                        .response("409", error_response("Name already taken"))
                        .build(),
                    "delete": Operation::new("Delete genre", tag)
                        .params(vec![id()])
                        .response("204", json!({"description": "Deleted"}))
                        .response("404", error_response("Unknown id"))
                        .build()
                }
            },
            "components": {
                "schemas": {
                    "Genre": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" }
                        },
                        "required": ["id", "name"]
                    },
                    "GenreInput": {
                        "type": "object",
                        "properties": { "name": { "type": "string" } },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE genres (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
                );
                CREATE UNIQUE INDEX idx_genres_name_nocase ON genres (name COLLATE NOCASE);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "genres module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "genres module stopped");
        Ok(())
    }
}

pub fn create_module(db: Database, pager: Pager) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(GenresModule::new(db, pager))
}
