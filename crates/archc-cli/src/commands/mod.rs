//! Command handlers, one module per subcommand.

pub mod classify;
pub mod compile;
pub mod completions;
pub mod plugins;

use std::path::Path;

use archc_adapters::{ManifestPluginCatalog, StaticPluginCatalog};
use archc_core::application::PluginCatalog;

/// The built-in registry, narrowed by a manifest when one is given. The
/// manifest itself is only read at discovery.
fn plugin_catalog(manifest: Option<&Path>) -> Box<dyn PluginCatalog> {
    let registry = StaticPluginCatalog::builtin();
    match manifest {
        Some(path) => Box::new(ManifestPluginCatalog::from_path(registry, path)),
        None => Box::new(registry),
    }
}
