//! GENERATE phase: run every planned plugin over the snapshot.

use tracing::{info, instrument, warn};

use crate::application::{
    options::Options,
    plugin::{ArtifactSink, EmittedArtifact, PluginContext, PluginExecutionPlan},
};
use crate::domain::{CompilationSession, Diagnostics, DiagnosticsFactory, IrSnapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Generator {
    factory: DiagnosticsFactory,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the plan in order. A failing plugin is reported as ARCH-201 and
    /// whatever it emitted before failing is discarded; the remaining
    /// plugins still run.
    #[instrument(skip_all, fields(round = ir.round(), plugins = plan.len()))]
    pub fn generate(
        &self,
        plan: &PluginExecutionPlan,
        ir: &IrSnapshot,
        session: &CompilationSession,
        options: &Options,
        diagnostics: &mut Diagnostics,
    ) -> Vec<EmittedArtifact> {
        let mut sink = ArtifactSink::new();

        for plugin in plan.plugins() {
            let id = plugin.id();
            let mark = sink.len();
            let mut context = PluginContext::new(id, ir, session, options.for_plugin(id), diagnostics, &mut sink);

            match plugin.apply(&mut context) {
                Ok(()) => info!(plugin = id, artifacts = sink.len() - mark, "plugin applied"),
                Err(error) => {
                    warn!(plugin = id, error = %error, "plugin failed");
                    sink.truncate(mark);
                    diagnostics.push(self.factory.plugin_failed(id, &error.to_string()));
                }
            }
        }

        sink.into_artifacts()
    }
}
