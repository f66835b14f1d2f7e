//! Kernel of the bookshelf service: layered settings, the `Module` contract
//! every feature module implements, and the registry that drives module
//! lifecycle in a fixed order.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
