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
use service::AuthorService;

/// Authors: names unique ignoring case, each credited on any number of books.
pub struct AuthorsModule {
    service: AuthorService,
}

impl AuthorsModule {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self {
            service: AuthorService::new(db, pager),
        }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Authors";
        let author = || schema_ref("Author");
        let id = || path_param("id", "integer");

        Some(json!({
            "paths": {
                "/": {
                    "get": Operation::new("List authors", tag)
                        .response("200", json_response("All authors by id", array_of(author())))
                        .build(),
                    "post": Operation::new("Create author", tag)
                        .body(schema_ref("AuthorInput"))
                        .response("201", json_response("Created author", author()))
                        .response("409", error_response("Name already taken"))
                        .response("422", error_response("Blank name"))
                        .build()
                },
                "/page": {
                    "get": Operation::new("Page through authors", tag)
                        .params(page_params())
                        .response("200", json_response("One page of authors", array_of(author())))
                        .response("400", error_response("Invalid page or sort"))
                        .build()
                },
                "/name": {
                    "get": Operation::new("Author names by first letter", tag)
                        .params(vec![query_param("firstLetter", "string", true)])
                        .response("200", json_response("Matching names", array_of(json!({"type": "string"}))))
                        .build()
                },
                "/batch": {
                    "post": Operation::new("Create several authors", tag)
                        .body(array_of(schema_ref("AuthorInput")))
                        .response("201", json_response("Identifiers", array_of(json!({"type": "integer"}))))
                        .response("409", error_response("Name already taken"))
                        .build()
                },
                "/lookup": {
                    "post": Operation::new("Fetch authors by id", tag)
                        .body(array_of(json!({"type": "integer"})))
                        .response("200", json_response("Authors in request order", array_of(author())))
                        .response("404", error_response("Unknown id"))
                        .build()
                },
                "/by-name/{name}": {
                    "get": Operation::new("Get author by exact name", tag)
                        .params(vec![path_param("name", "string")])
                        .response("200", json_response("Author", author()))
                        .response("404", error_response("Unknown name"))
                        .build()
                },
                "/{id}": {
                    "get": Operation::new("Get author", tag)
                        .params(vec![id()])
                        .response("200", json_response("Author", author()))
                        .response("404", error_response("Unknown id"))
                        .build(),
                    "patch": Operation::new("Rename author", tag)
                        .params(vec![id()])
                        .body(schema_ref("AuthorInput"))
                        .response("200", json_response("Updated author", author()))
                        .response("404", error_response("Unknown id"))
                        .response("409", error_response("Name already taken"))
                        .build(),
                    "delete": Operation::new("Delete author", tag)
                        .params(vec![id()])
                        .response("204", json!({"description": "Deleted"}))
                        .response("404", error_response("Unknown id"))
                        .build()
                },
                "/{id}/books": {
                    "get": Operation::new("Titles of the author's books", tag)
                        .params(vec![id()])
                        .response("200", json_response("Titles", array_of(json!({"type": "string"}))))
                        .response("404", error_response("Unknown id"))
                        .build()
                },
                "/{id}/books/count": {
                    "get": Operation::new("Number of the author's books", tag)
                        .params(vec![id()])
                        .response("200", json_response("Count", json!({"type": "integer"})))
                        .response("404", error_response("Unknown id"))
                        .build()
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" },
                            "books": { "type": "array", "items": { "type": "string" } }
                        },
                        "required": ["id", "name", "books"]
                    },
                    "AuthorInput": {
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
                CREATE TABLE authors (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL CHECK (length(trim(name)) > 0)
                );
                CREATE UNIQUE INDEX idx_authors_name_nocase ON authors (name COLLATE NOCASE);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(db: Database, pager: Pager) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(db, pager))
}
