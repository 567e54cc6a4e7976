//! Infrastructure adapters for archc.
//!
//! This crate implements the ports defined in `archc-core::application::ports`
//! and ships the built-in plugins. It owns every I/O concern: the local and
//! in-memory filesystems, the JSON source model host, plugin discovery and
//! options files.

pub mod filesystem;
pub mod host;
pub mod options_loader;
pub mod plugins;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use host::{JsonModelHost, StaticHost};
pub use options_loader::{load_options, parse_options};
pub use plugins::{ManifestPluginCatalog, PluginManifest, StaticPluginCatalog};
