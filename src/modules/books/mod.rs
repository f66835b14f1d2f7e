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
use service::BookService;

/// Books module: owns the `books` table and both association tables.
pub struct BooksModule {
    service: BookService,
}

impl BooksModule {
    pub fn new(db: Database, pager: Pager) -> Self {
        Self {
            service: BookService::new(db, pager),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Books";
        let book = || schema_ref("Book");
        let books = || array_of(schema_ref("Book"));
        let id = || path_param("id", "integer");

        Some(json!({
            "paths": {
                "/": {
                    "get": Operation::new("List books", tag)
                        .response("200", json_response("All books by id", books()))
                        .build(),
                    "post": Operation::new("Create book", tag)
                        .body(schema_ref("NewBook"))
                        .response("201", json_response("Created book", book()))
                        .response("404", error_response("Unknown author or genre"))
                        .response("409", error_response("ISBN already taken"))
                        .response("422", error_response("Missing title, ISBN, authors or genres"))
                        .build()
                },
                "/page": {
                    "get": Operation::new("Page through books", tag)
                        .params(page_params())
                        .response("200", json_response("One page of books", books()))
                        .response("400", error_response("Invalid page or sort"))
                        .build()
                },
                "/name": {
                    "get": Operation::new("Book titles by first letter", tag)
                        .params(vec![query_param("firstLetter", "string", true)])
                        .response("200", json_response("Matching titles", array_of(json!({"type": "string"}))))
                        .build()
                },
                "/batch": {
                    "post": Operation::new("Create several books", tag)
                        .body(array_of(schema_ref("NewBook")))
                        .response("201", json_response("Identifiers", array_of(json!({"type": "integer"}))))
                        .response("409", error_response("ISBN already taken"))
                        .build()
                },
                "/lookup": {
                    "post": Operation::new("Fetch books by id", tag)
                        .body(array_of(json!({"type": "integer"})))
                        .response("200", json_response("Books in request order", books()))
                        .response("404", error_response("Unknown id"))
                        .build()
                },
                "/isbn/{isbn}": {
                    "get": Operation::new("Get book by ISBN", tag)
                        .params(vec![path_param("isbn", "string")])
                        .response("200", json_response("Book", book()))
                        .response("404", error_response("Unknown ISBN"))
                        .build()
                },
                "/title/{title}": {
                    "get": Operation::new("Get book by exact title", tag)
                        .params(vec![path_param("title", "string")])
                        .response("200", json_response("Book", book()))
                        .response("404", error_response("Unknown title"))
                        .build()
                },
                "/genre/{name}": {
                    "get": Operation::new("Books in a genre", tag)
                        .params(vec![path_param("name", "string")])
                        .response("200", json_response("Books ordered by title; empty for an unknown genre", books()))
                        .build()
                },
                "/{id}": {
                    "get": Operation::new("Get book", tag)
                        .params(vec![id()])
                        .response("200", json_response("Book", book()))
                        .response("404", error_response("Unknown id"))
                        .build(),
                    "patch": Operation::new("Update book", tag)
                        .params(vec![id()])
                        .body(schema_ref("BookPatch"))
                        .response("200", json_response("Updated book", book()))
                        .response("404", error_response("Unknown id"))
                        .response("409", error_response("ISBN already taken"))
                        .build(),
                    "delete": Operation::new("Delete book", tag)
                        .params(vec![id()])
                        .response("204", json!({"description": "Deleted"}))
                        .response("404", error_response("Unknown id"))
                        .build()
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "authors": { "type": "array", "items": schema_ref("NamedRef") },
                            "genres": { "type": "array", "items": schema_ref("NamedRef") }
                        },
                        "required": ["id", "title", "isbn", "authors", "genres"]
                    },
                    "NamedRef": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer" },
                            "name": { "type": "string" }
                        },
                        "required": ["id", "name"]
                    },
                    "NewBook": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "authorIds": { "type": "array", "items": { "type": "integer" } },
                            "genreIds": { "type": "array", "items": { "type": "integer" } }
                        },
                        "required": ["title", "isbn", "authorIds", "genreIds"]
                    },
                    "BookPatch": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "isbn": { "type": "string" },
                            "authorIds": { "type": "array", "items": { "type": "integer" } },
                            "genreIds": { "type": "array", "items": { "type": "integer" } }
                        }
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE books (
                    id    INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT NOT NULL,
                    isbn  TEXT NOT NULL UNIQUE
                );
                CREATE INDEX idx_books_title ON books (title);

                CREATE TABLE book_author (
                    book_id   INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    author_id INTEGER NOT NULL REFERENCES authors (id) ON DELETE CASCADE,
                    PRIMARY KEY (book_id, author_id)
                );
                CREATE INDEX idx_book_author_author ON book_author (author_id);

                CREATE TABLE book_genre (
                    book_id  INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    genre_id INTEGER NOT NULL REFERENCES genres (id) ON DELETE CASCADE,
                    PRIMARY KEY (book_id, genre_id)
                );
                CREATE INDEX idx_book_genre_genre ON book_genre (genre_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(db: Database, pager: Pager) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(db, pager))
}
