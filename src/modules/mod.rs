pub mod authors;
pub mod books;
pub mod genres;

use bookshelf_db::Database;
use bookshelf_kernel::ModuleRegistry;

use crate::pagination::Pager;

/// Register the catalog modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &Database, pager: Pager) {
    registry.register_custom(authors::create_module(db.clone(), pager));
    registry.register_custom(books::create_module(db.clone(), pager));
    registry.register_custom(genres::create_module(db.clone(), pager));
}
