//! Plugins: the generators that turn a validated IR into artifacts.
//!
//! Discovery (a [`PluginCatalog`](crate::application::ports::PluginCatalog))
//! and ordering ([`PluginExecutionPlan`]) are separate: the catalog returns
//! an unordered set and the plan sorts it deterministically.

use std::{fmt, sync::Arc};

use crate::application::options::PluginOptions;
use crate::domain::{
    ApplicationModel, CompilationSession, Diagnostic, DiagnosticReporter, DiagnosticsFactory, DomainModel,
    GeneratedArtifact, IrSnapshot, NamingConventions, PortModel, TypeSystem,
};
use crate::error::ArchResult;

/// Ordering hint. Best effort: a plugin must not rely on it for
/// correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum PluginOrder {
    Early,
    #[default]
    Normal,
    Late,
}

impl PluginOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "EARLY",
            Self::Normal => "NORMAL",
            Self::Late => "LATE",
        }
    }
}

impl fmt::Display for PluginOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

pub trait Plugin: Send + Sync {
    /// Stable id; also the options namespace.
    fn id(&self) -> &str;

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(self.id())
    }

    fn order(&self) -> PluginOrder {
        PluginOrder::Normal
    }

    fn apply(&self, context: &mut PluginContext<'_>) -> ArchResult<()>;
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("id", &self.id())
            .field("order", &self.order())
            .finish()
    }
}

/// Ordered, immutable list of plugins for one compilation.
#[derive(Debug, Clone, Default)]
pub struct PluginExecutionPlan {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginExecutionPlan {
    /// Sort by `(order, id)` and drop repeated ids, keeping the first in
    /// that order. Every dropped plugin is reported as ARCH-107.
    pub fn build(mut plugins: Vec<Arc<dyn Plugin>>, reporter: &mut dyn DiagnosticReporter) -> Self {
        plugins.sort_by(|a, b| (a.order(), a.id()).cmp(&(b.order(), b.id())));

        let mut seen = std::collections::HashSet::new();
        let mut kept = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            if seen.insert(plugin.id().to_string()) {
                kept.push(plugin);
            } else {
                reporter.report(DiagnosticsFactory::new().duplicate_plugin_id(plugin.id()));
            }
        }

        Self { plugins: kept }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
        &self.plugins
    }

    pub fn ids(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// An artifact together with the plugin that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifact {
    pub plugin: String,
    pub artifact: GeneratedArtifact,
}

/// Collects the artifacts of one GENERATE phase.
#[derive(Debug, Default)]
pub struct ArtifactSink {
    artifacts: Vec<EmittedArtifact>,
}

impl ArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, plugin: &str, artifact: GeneratedArtifact) {
        self.artifacts.push(EmittedArtifact {
            plugin: plugin.to_string(),
            artifact,
        });
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Drop everything emitted after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.artifacts.truncate(mark);
    }

    pub fn into_artifacts(self) -> Vec<EmittedArtifact> {
        self.artifacts
    }
}

/// What a plugin sees while it runs.
pub struct PluginContext<'a> {
    plugin_id: &'a str,
    ir: &'a IrSnapshot,
    session: &'a CompilationSession,
    options: PluginOptions<'a>,
    naming: NamingConventions,
    reporter: &'a mut dyn DiagnosticReporter,
    sink: &'a mut ArtifactSink,
}

impl<'a> PluginContext<'a> {
    pub fn new(
        plugin_id: &'a str,
        ir: &'a IrSnapshot,
        session: &'a CompilationSession,
        options: PluginOptions<'a>,
        reporter: &'a mut dyn DiagnosticReporter,
        sink: &'a mut ArtifactSink,
    ) -> Self {
        Self {
            plugin_id,
            ir,
            session,
            options,
            naming: NamingConventions::new(),
            reporter,
            sink,
        }
    }

    pub fn plugin_id(&self) -> &str {
        self.plugin_id
    }

    pub fn ir(&self) -> &'a IrSnapshot {
        self.ir
    }

    pub fn domain(&self) -> &'a DomainModel {
        self.ir.domain()
    }

    pub fn ports(&self) -> &'a PortModel {
        self.ir.ports()
    }

    pub fn application(&self) -> &'a ApplicationModel {
        self.ir.application()
    }

    pub fn session(&self) -> &'a CompilationSession {
        self.session
    }

    pub fn options(&self) -> PluginOptions<'a> {
        self.options
    }

    pub fn naming(&self) -> NamingConventions {
        self.naming
    }

    pub fn type_system(&self) -> TypeSystem<'a> {
        self.ir.type_system()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.reporter.report(diagnostic);
    }

    pub fn emit(&mut self, artifact: GeneratedArtifact) {
        self.sink.emit(self.plugin_id, artifact);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FixedPlugin;
    use super::*;
    use crate::domain::{Diagnostics, codes};

    #[test]
    fn plan_sorts_by_order_then_id() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(FixedPlugin::new("zeta", PluginOrder::Normal)),
            Arc::new(FixedPlugin::new("late", PluginOrder::Late)),
            Arc::new(FixedPlugin::new("alpha", PluginOrder::Normal)),
            Arc::new(FixedPlugin::new("early", PluginOrder::Early)),
        ];
        let mut diagnostics = Diagnostics::new();
        let plan = PluginExecutionPlan::build(plugins, &mut diagnostics);

        assert_eq!(plan.ids(), vec!["early", "alpha", "zeta", "late"]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn plan_drops_duplicate_ids_with_a_warning() {
        let plugins: Vec<Arc<dyn Plugin>> = vec![
            Arc::new(FixedPlugin::new("doc", PluginOrder::Late)),
            Arc::new(FixedPlugin::new("doc", PluginOrder::Early)),
        ];
        let mut diagnostics = Diagnostics::new();
        let plan = PluginExecutionPlan::build(plugins, &mut diagnostics);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.plugins()[0].order(), PluginOrder::Early);
        assert_eq!(diagnostics.with_code(&codes::duplicate_plugin_id()).count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
    }
}
