//! Pipeline orchestrator: drives the phases of one compilation.
//!
//! ```text
//! DISCOVER_PLUGINS (once)
//!        │
//!        ▼
//!   ┌─ ANALYZE ─▶ VALIDATE ─▶ GENERATE ─▶ WRITE ─┐   every round with elements
//!   └────────────────────────────────────────────┘
//!        │
//!        ▼
//!     FINISH (once, on the final round)
//! ```
//!
//! One orchestrator serves exactly one [`CompilationSession`]. Discovery and
//! the plugin plan are memoized. Each round is folded into the session's
//! [`SourceSet`] and the whole set is re-analyzed, so the model never depends
//! on how the host batched its elements. The phase engines are built on
//! first use.

use std::{collections::HashMap, fmt};

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::application::{
    options::Options,
    plugin::PluginExecutionPlan,
    ports::{PluginCatalog, SourceHost},
    services::{
        analyzer::Analyzer,
        generator::Generator,
        validator::Validator,
        writer::{ArtifactWriter, WriteOutcome, WriteStatus},
    },
};
use crate::domain::{
    CompilationSession, Diagnostic, Diagnostics, DiagnosticsFactory, DomainKind, IrSnapshot, Round, SourceSet,
};
use crate::error::{ArchError, ArchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    DiscoverPlugins,
    Analyze,
    Validate,
    Generate,
    Write,
    Finish,
}

impl Phase {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DiscoverPlugins => "DISCOVER_PLUGINS",
            Self::Analyze => "ANALYZE",
            Self::Validate => "VALIDATE",
            Self::Generate => "GENERATE",
            Self::Write => "WRITE",
            Self::Finish => "FINISH",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one call to [`PipelineOrchestrator::process_round`] did.
#[derive(Debug, Clone)]
pub struct RoundReport {
    pub round: u32,
    /// `None` when the round carried no elements.
    pub ir: Option<IrSnapshot>,
    pub validation_errors: usize,
    pub generation_skipped: bool,
    pub outcomes: Vec<WriteOutcome>,
    pub finished: bool,
}

/// Result of a whole compilation.
#[derive(Debug)]
pub struct CompilationSummary {
    pub session_id: Uuid,
    pub rounds: u32,
    pub plugins: Vec<String>,
    pub outcomes: Vec<WriteOutcome>,
    pub diagnostics: Diagnostics,
}

impl CompilationSummary {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Artifacts whose target was created or changed.
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == WriteStatus::Written)
            .count()
    }
}

pub struct PipelineOrchestrator {
    session: CompilationSession,
    catalog: Box<dyn PluginCatalog>,
    options: Options,
    fail_on_validation_errors: bool,
    plan: Option<PluginExecutionPlan>,
    analyzer: Option<Analyzer>,
    validator: Option<Validator>,
    generator: Option<Generator>,
    writer: ArtifactWriter,
    sources: SourceSet,
    known_kinds: HashMap<String, DomainKind>,
    factory: DiagnosticsFactory,
    diagnostics: Diagnostics,
    outcomes: Vec<WriteOutcome>,
    phase: Option<Phase>,
    rounds: u32,
    finished: bool,
}

impl PipelineOrchestrator {
    pub fn new(session: CompilationSession, catalog: Box<dyn PluginCatalog>, writer: ArtifactWriter) -> Self {
        Self {
            session,
            catalog,
            options: Options::new(),
            fail_on_validation_errors: true,
            plan: None,
            analyzer: None,
            validator: None,
            generator: None,
            writer,
            sources: SourceSet::new(),
            known_kinds: HashMap::new(),
            factory: DiagnosticsFactory::new(),
            diagnostics: Diagnostics::new(),
            outcomes: Vec::new(),
            phase: None,
            rounds: 0,
            finished: false,
        }
    }

    /// Options resolved for the whole session.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn fail_on_validation_errors(mut self, fail: bool) -> Self {
        self.fail_on_validation_errors = fail;
        self
    }

    pub fn session(&self) -> &CompilationSession {
        &self.session
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Last phase entered, `None` before the first round.
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Elements accumulated over all rounds so far.
    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    /// Drive the host until it signals the final round or runs dry.
    pub fn run(mut self, host: &mut dyn SourceHost) -> ArchResult<CompilationSummary> {
        while !self.finished {
            match host.next_round()? {
                Some(round) => {
                    self.process_round(&round)?;
                }
                None => {
                    debug!("host exhausted without a final round");
                    self.finish();
                }
            }
        }
        Ok(self.into_summary())
    }

    /// Run one round through the phases.
    ///
    /// Errors only on misuse (a round after FINISH) or when the host data is
    /// malformed; findings about the sources are diagnostics.
    #[instrument(skip_all, fields(session = %self.session.id(), round = round.number))]
    pub fn process_round(&mut self, round: &Round) -> ArchResult<RoundReport> {
        if self.finished {
            return Err(ArchError::internal(format!(
                "round {} received after the compilation finished",
                round.number
            )));
        }
        self.ensure_plan();
        self.rounds += 1;

        let mut report = RoundReport {
            round: round.number,
            ir: None,
            validation_errors: 0,
            generation_skipped: false,
            outcomes: Vec::new(),
            finished: false,
        };

        if !round.elements.is_empty() {
            self.enter(Phase::Analyze);
            let added = self.sources.absorb(round);
            debug!(added, total = self.sources.len(), "round absorbed");

            let mut findings = Diagnostics::new();
            let ir = self
                .analyzer
                .get_or_insert_with(Analyzer::new)
                .analyze(&self.sources.as_round(round), &mut findings)?;
            self.record(findings.into_vec());
            self.note_kind_changes(&ir);
            self.diagnostics.push(self.factory.round_analyzed(
                round.number,
                ir.domain().len(),
                ir.ports().len(),
                ir.application().len(),
            ));

            self.enter(Phase::Validate);
            let findings = self.validator.get_or_insert_with(Validator::new).validate(&ir);
            report.validation_errors = findings.iter().filter(|d| d.is_error()).count();
            self.record(findings);

            if report.validation_errors > 0 && self.fail_on_validation_errors {
                warn!(errors = report.validation_errors, "validation failed, generation skipped");
                self.diagnostics
                    .push(self.factory.generation_skipped(round.number, report.validation_errors));
                report.generation_skipped = true;
            } else {
                report.outcomes = self.generate_and_write(&ir);
                self.outcomes.extend(report.outcomes.iter().cloned());
            }
            report.ir = Some(ir);
        }

        if round.processing_over {
            self.finish();
            report.finished = true;
        }
        Ok(report)
    }

    pub fn into_summary(self) -> CompilationSummary {
        CompilationSummary {
            session_id: self.session.id(),
            rounds: self.rounds,
            plugins: self
                .plan
                .as_ref()
                .map(|plan| plan.ids().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            outcomes: self.outcomes,
            diagnostics: self.diagnostics,
        }
    }

    fn generate_and_write(&mut self, ir: &IrSnapshot) -> Vec<WriteOutcome> {
        self.enter(Phase::Generate);
        let plan = self.plan.get_or_insert_with(PluginExecutionPlan::empty);
        let generator = self.generator.get_or_insert_with(Generator::new);
        let artifacts = generator.generate(plan, ir, &self.session, &self.options, &mut self.diagnostics);

        self.enter(Phase::Write);
        self.writer.write_all(&artifacts, &mut self.diagnostics)
    }

    /// Re-analysis repeats findings about unchanged sources; report each once.
    fn record(&mut self, findings: Vec<Diagnostic>) {
        for finding in findings {
            self.diagnostics.push_new(finding);
        }
    }

    fn note_kind_changes(&mut self, ir: &IrSnapshot) {
        for domain_type in ir.domain().types() {
            let kind = domain_type.kind();
            let previous = self
                .known_kinds
                .insert(domain_type.qualified_name().to_string(), kind);
            if let Some(previous) = previous.filter(|previous| *previous != kind) {
                info!(subject = domain_type.qualified_name(), from = %previous, to = %kind, "kind changed");
                self.diagnostics.push(self.factory.kind_changed(
                    domain_type.qualified_name(),
                    previous.as_str(),
                    kind.as_str(),
                ));
            }
        }
    }

    /// DISCOVER_PLUGINS, at most once per session. A failing catalog leaves
    /// the session without plugins.
    fn ensure_plan(&mut self) {
        if self.plan.is_some() {
            return;
        }
        self.enter(Phase::DiscoverPlugins);
        let plugins = match self.catalog.discover() {
            Ok(plugins) => plugins,
            Err(error) => {
                warn!(error = %error, "plugin discovery failed");
                self.diagnostics.push(self.factory.discovery_failed(&error.to_string()));
                Vec::new()
            }
        };
        let plan = PluginExecutionPlan::build(plugins, &mut self.diagnostics);
        info!(plugins = ?plan.ids(), "plugin plan ready");
        self.plan = Some(plan);
    }

    fn finish(&mut self) {
        self.enter(Phase::Finish);
        let written = self
            .outcomes
            .iter()
            .filter(|outcome| outcome.status.is_up_to_date())
            .count();
        self.diagnostics
            .push(self.factory.compilation_finished(self.rounds, written));
        info!(
            rounds = self.rounds,
            errors = self.diagnostics.error_count(),
            warnings = self.diagnostics.warning_count(),
            "compilation finished"
        );
        self.finished = true;
    }

    fn enter(&mut self, phase: Phase) {
        debug!(phase = %phase, "entering phase");
        self.phase = Some(phase);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::{
        ApplicationError,
        plugin::{Plugin, PluginOrder, testing::FixedPlugin},
        ports::MockPluginCatalog,
        services::writer::testing::MapFilesystem,
    };
    use crate::domain::{
        AnnotationFact, ElementKind, FieldFact, OutputLayout, SessionConfig, SourceElement, TypeReference, codes,
    };

    fn catalog(ids: &'static [&'static str]) -> MockPluginCatalog {
        let mut catalog = MockPluginCatalog::new();
        catalog.expect_discover().times(1).returning(move || {
            Ok(ids
                .iter()
                .map(|&id| Arc::new(FixedPlugin::new(id, PluginOrder::Normal)) as Arc<dyn Plugin>)
                .collect())
        });
        catalog
    }

    fn orchestrator(catalog: MockPluginCatalog, fs: &MapFilesystem) -> PipelineOrchestrator {
        let session = CompilationSession::start(SessionConfig::default()).unwrap();
        let writer = ArtifactWriter::new(Box::new(fs.clone()), OutputLayout::new("out"));
        PipelineOrchestrator::new(session, Box::new(catalog), writer)
    }

    fn root(name: &str) -> SourceElement {
        SourceElement::new(ElementKind::Class, name)
            .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"))
            .with_field(FieldFact::new("id", TypeReference::class(format!("{name}Id"))))
    }

    #[test]
    fn rounds_run_all_phases_and_finish_once() {
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&["doc"]), &fs);

        let first = pipeline.process_round(&Round::new(1, vec![root("com.acme.Order")])).unwrap();
        assert_eq!(first.outcomes.len(), 1);
        assert_eq!(first.outcomes[0].status, WriteStatus::Written);
        assert_eq!(pipeline.phase(), Some(Phase::Write));
        assert_eq!(fs.text("out/docs/doc.md").as_deref(), Some("# 1\n"));

        let last = pipeline.process_round(&Round::last(2, vec![])).unwrap();
        assert!(last.finished);
        assert!(last.ir.is_none());
        assert_eq!(pipeline.phase(), Some(Phase::Finish));

        let summary = pipeline.into_summary();
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.plugins, vec!["doc".to_string()]);
        assert_eq!(summary.diagnostics.with_code(&codes::round_analyzed()).count(), 1);
        assert_eq!(summary.diagnostics.with_code(&codes::compilation_finished()).count(), 1);
    }

    #[test]
    fn round_after_finish_is_an_internal_error() {
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&[]), &fs);
        pipeline.process_round(&Round::last(1, vec![])).unwrap();

        let error = pipeline.process_round(&Round::new(2, vec![])).unwrap_err();
        assert!(matches!(error, ArchError::Internal { .. }));
    }

    #[test]
    fn discovery_failure_degrades_to_no_plugins() {
        let mut failing = MockPluginCatalog::new();
        failing
            .expect_discover()
            .times(1)
            .returning(|| Err(ApplicationError::PluginDiscovery { reason: "manifest unreadable".into() }.into()));
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(failing, &fs);

        let report = pipeline.process_round(&Round::new(1, vec![root("com.acme.Order")])).unwrap();
        let last = pipeline.process_round(&Round::last(2, vec![root("com.acme.Invoice")])).unwrap();

        assert!(report.outcomes.is_empty());
        assert!(report.ir.is_some());
        assert_eq!(last.ir.map(|ir| ir.domain().aggregate_roots().count()), Some(2));
        assert!(pipeline.is_finished());
        assert_eq!(pipeline.diagnostics().with_code(&codes::discovery_failed()).count(), 1);
        assert_eq!(pipeline.diagnostics().with_code(&codes::round_analyzed()).count(), 2);
        assert_eq!(pipeline.diagnostics().with_code(&codes::compilation_finished()).count(), 1);
        assert!(!pipeline.diagnostics().has_errors());
    }

    #[test]
    fn later_rounds_see_earlier_elements() {
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&[]), &fs);

        pipeline.process_round(&Round::new(1, vec![root("com.acme.Order")])).unwrap();
        let second = pipeline.process_round(&Round::new(2, vec![root("com.acme.Invoice")])).unwrap();

        let ir = second.ir.unwrap();
        let roots: Vec<_> = ir.domain().aggregate_roots().map(|t| t.qualified_name()).collect();
        assert!(roots.contains(&"com.acme.Order"));
        assert!(roots.contains(&"com.acme.Invoice"));
        assert_eq!(pipeline.sources().len(), 2);
    }

    #[test]
    fn late_repository_reclassifies_its_aggregate() {
        let customer = SourceElement::new(ElementKind::Class, "com.acme.Customer")
            .with_field(FieldFact::new("id", TypeReference::class("com.acme.CustomerId")));
        let repository = SourceElement::new(ElementKind::Interface, "com.acme.CustomerRepository");

        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&[]), &fs);
        let first = pipeline.process_round(&Round::new(1, vec![customer])).unwrap();
        let kind_of = |ir: &IrSnapshot| ir.domain_index().get("com.acme.Customer").map(|t| t.kind());
        assert_ne!(first.ir.as_ref().and_then(kind_of), Some(DomainKind::AggregateRoot));

        let second = pipeline.process_round(&Round::last(2, vec![repository])).unwrap();
        assert_eq!(second.ir.as_ref().and_then(kind_of), Some(DomainKind::AggregateRoot));

        let kind_changed_code = codes::kind_changed();
        let changed: Vec<_> = pipeline.diagnostics().with_code(&kind_changed_code).collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].subject(), Some("com.acme.Customer"));
    }

    #[test]
    fn repeated_findings_are_reported_once() {
        let order = root("com.acme.Order").with_field(FieldFact::new(
            "customer",
            TypeReference::class("com.acme.Customer"),
        ));
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&[]), &fs).fail_on_validation_errors(false);

        let first = pipeline.process_round(&Round::new(1, vec![order, root("com.acme.Customer")])).unwrap();
        let second = pipeline.process_round(&Round::new(2, vec![root("com.acme.Invoice")])).unwrap();

        assert_eq!(first.validation_errors, 1);
        assert_eq!(second.validation_errors, 1);
        assert_eq!(pipeline.diagnostics().with_code(&codes::inter_aggregate_reference()).count(), 1);
    }

    #[test]
    fn engines_are_built_on_first_use() {
        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&["doc"]), &fs);
        assert!(pipeline.analyzer.is_none() && pipeline.validator.is_none() && pipeline.generator.is_none());

        pipeline.process_round(&Round::new(1, Vec::new())).unwrap();
        assert!(pipeline.analyzer.is_none());

        pipeline.process_round(&Round::last(2, vec![root("com.acme.Order")])).unwrap();
        assert!(pipeline.analyzer.is_some() && pipeline.validator.is_some() && pipeline.generator.is_some());
    }

    #[test]
    fn validation_errors_skip_generation() {
        let order = root("com.acme.Order").with_field(FieldFact::new(
            "customer",
            TypeReference::class("com.acme.Customer"),
        ));
        let round = Round::new(1, vec![order, root("com.acme.Customer")]);

        let fs = MapFilesystem::default();
        let mut pipeline = orchestrator(catalog(&["doc"]), &fs);
        let report = pipeline.process_round(&round).unwrap();

        assert_eq!(report.validation_errors, 1);
        assert!(report.generation_skipped);
        assert!(report.outcomes.is_empty());
        assert_eq!(pipeline.diagnostics().with_code(&codes::generation_skipped()).count(), 1);

        let fs = MapFilesystem::default();
        let mut lenient = orchestrator(catalog(&["doc"]), &fs).fail_on_validation_errors(false);
        let report = lenient.process_round(&round).unwrap();
        assert_eq!(report.outcomes.len(), 1);
    }

    #[test]
    fn run_finishes_when_host_runs_dry() {
        struct OneRound(Option<Round>);
        impl SourceHost for OneRound {
            fn next_round(&mut self) -> ArchResult<Option<Round>> {
                Ok(self.0.take())
            }
        }

        let fs = MapFilesystem::default();
        let mut host = OneRound(Some(Round::new(1, vec![root("com.acme.Order")])));
        let summary = orchestrator(catalog(&["doc"]), &fs).run(&mut host).unwrap();

        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.written(), 1);
        assert!(!summary.has_errors());
    }
}
