//! Project-specific utilities shared by the catalog modules' routes.

pub mod openapi;

use bookshelf_http::error::AppError;
use serde::Deserialize;

/// `?firstLetter=X` on prefix search routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LetterQuery {
    pub first_letter: String,
}

impl LetterQuery {
    /// The parameter must be exactly one character.
    pub fn letter(&self) -> Result<char, AppError> {
        let mut chars = self.first_letter.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Ok(letter),
            _ => Err(AppError::bad_request(format!(
                "firstLetter must be a single character, got '{}'",
                self.first_letter
            ))),
        }
    }
}

/// Formats a shared log prefix for project logs.
pub fn log_prefix(module: &str) -> String {
    format!("bookshelf::{module}")
}
