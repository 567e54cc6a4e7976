//! Built-in plugins and the catalogs that discover them.

pub mod catalog;
pub mod ir_inventory;
pub mod living_doc;
pub mod repository_stub;

pub use catalog::{ManifestPluginCatalog, PluginManifest, StaticPluginCatalog};
pub use ir_inventory::IrInventoryPlugin;
pub use living_doc::LivingDocPlugin;
pub use repository_stub::RepositoryStubPlugin;
