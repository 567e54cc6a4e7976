//! Plugin discovery.
//!
//! Plugins are compiled in and registered with a [`StaticPluginCatalog`].
//! A [`ManifestPluginCatalog`] narrows that registry with a TOML manifest:
//!
//! ```toml
//! # archc-plugins.toml
//! enabled  = ["living-doc", "repository-stub"]   # optional; default: all
//! disabled = ["ir-inventory"]                     # optional
//! ```

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use archc_core::{
    application::{ApplicationError, Plugin, PluginCatalog},
    error::ArchResult,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{IrInventoryPlugin, LivingDocPlugin, RepositoryStubPlugin};

/// Fixed set of registered plugins, returned as-is on discovery.
#[derive(Clone, Default)]
pub struct StaticPluginCatalog {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl StaticPluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The plugins shipped with archc.
    pub fn builtin() -> Self {
        Self::new()
            .register(Arc::new(LivingDocPlugin::new()))
            .register(Arc::new(IrInventoryPlugin::new()))
            .register(Arc::new(RepositoryStubPlugin::new()))
    }

    pub fn register(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.iter().find(|plugin| plugin.id() == id)
    }
}

impl std::fmt::Debug for StaticPluginCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<&str> = self.plugins.iter().map(|p| p.id()).collect();
        f.debug_struct("StaticPluginCatalog").field("plugins", &ids).finish()
    }
}

impl PluginCatalog for StaticPluginCatalog {
    fn discover(&self) -> ArchResult<Vec<Arc<dyn Plugin>>> {
        Ok(self.plugins.clone())
    }
}

/// Deserialized `archc-plugins.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    pub enabled: Option<Vec<String>>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl PluginManifest {
    pub fn parse(source: &str, origin: &Path) -> ArchResult<Self> {
        toml::from_str(source).map_err(|e| {
            ApplicationError::PluginDiscovery {
                reason: format!("failed to parse '{}': {e}", origin.display()),
            }
            .into()
        })
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> ArchResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ApplicationError::PluginDiscovery {
            reason: format!("failed to read '{}': {e}", path.display()),
        })?;
        Self::parse(&raw, path)
    }
}

/// A registry filtered by a manifest. Every id the manifest names must be
/// registered; discovery fails otherwise.
///
/// A manifest given by path is read on [`PluginCatalog::discover`], so an
/// unreadable or malformed file is a discovery failure like any other.
#[derive(Debug, Clone)]
pub struct ManifestPluginCatalog {
    registry: StaticPluginCatalog,
    manifest: Option<PluginManifest>,
    origin: PathBuf,
}

impl ManifestPluginCatalog {
    pub fn new(registry: StaticPluginCatalog, manifest: PluginManifest, origin: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            manifest: Some(manifest),
            origin: origin.into(),
        }
    }

    /// Defers reading `path` until discovery.
    pub fn from_path(registry: StaticPluginCatalog, path: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            manifest: None,
            origin: path.into(),
        }
    }

    fn manifest(&self) -> ArchResult<Cow<'_, PluginManifest>> {
        match &self.manifest {
            Some(manifest) => Ok(Cow::Borrowed(manifest)),
            None => PluginManifest::load(&self.origin).map(Cow::Owned),
        }
    }

    fn unknown(&self, id: &str) -> ApplicationError {
        ApplicationError::PluginDiscovery {
            reason: format!("'{}' names unknown plugin '{id}'", self.origin.display()),
        }
    }
}

impl PluginCatalog for ManifestPluginCatalog {
    #[instrument(skip_all, fields(manifest = %self.origin.display()))]
    fn discover(&self) -> ArchResult<Vec<Arc<dyn Plugin>>> {
        let manifest = self.manifest()?;
        for id in manifest.enabled.iter().flatten().chain(&manifest.disabled) {
            if self.registry.get(id).is_none() {
                return Err(self.unknown(id).into());
            }
        }

        let selected: Vec<Arc<dyn Plugin>> = match &manifest.enabled {
            Some(enabled) => enabled.iter().filter_map(|id| self.registry.get(id).cloned()).collect(),
            None => self.registry.plugins().to_vec(),
        };
        let selected: Vec<Arc<dyn Plugin>> = selected
            .into_iter()
            .filter(|plugin| !manifest.disabled.iter().any(|id| id == plugin.id()))
            .collect();

        debug!(count = selected.len(), "plugins selected by manifest");
        Ok(selected)
    }
}
