//! Bookshelf catalog application library
//!
//! Books, authors and genres with their associations, served over REST by
//! the bookshelf kernel.

pub mod bootstrap;
pub mod error;
pub mod modules;
pub mod pagination;
pub mod utils;
pub mod validation;

/// Re-export commonly used types
pub use bootstrap::App;
pub use error::{CatalogError, CatalogResult, EntityKind};
pub use modules::*;
