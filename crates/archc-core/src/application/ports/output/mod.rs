//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `archc-adapters` crate provides implementations.

use std::{path::Path, sync::Arc};

use crate::application::plugin::Plugin;
use crate::domain::Round;
use crate::error::ArchResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `archc_adapters::filesystem::LocalFilesystem` (production)
/// - `archc_adapters::filesystem::MemoryFilesystem` (testing, dry runs)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ArchResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> ArchResult<Vec<u8>>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &[u8]) -> ArchResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Port for plugin discovery.
///
/// Returns an unordered set; execution order is decided separately by
/// `PluginExecutionPlan`.
///
/// Implemented by:
/// - `archc_adapters::plugins::StaticPluginCatalog` (registration list)
/// - `archc_adapters::plugins::ManifestPluginCatalog` (TOML manifest)
#[cfg_attr(test, mockall::automock)]
pub trait PluginCatalog: Send + Sync {
    fn discover(&self) -> ArchResult<Vec<Arc<dyn Plugin>>>;
}

/// Port for the host that supplies source elements round by round.
///
/// Implemented by:
/// - `archc_adapters::host::JsonModelHost`
/// - `archc_adapters::host::StaticHost` (tests)
pub trait SourceHost {
    /// Next round, or `None` once the host has nothing more to supply.
    fn next_round(&mut self) -> ArchResult<Option<Round>>;
}
