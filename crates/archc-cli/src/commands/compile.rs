//! `archc compile`: the full pipeline, from model to written artifacts.

use std::sync::Arc;

use archc_adapters::{JsonModelHost, LocalFilesystem, MemoryFilesystem, load_options};
use archc_core::{
    application::{ArtifactWriter, CompilationSummary, Filesystem, Options, PipelineOrchestrator, WriteOutcome, WriteStatus},
    domain::{CompilationSession, Diagnostic},
    error::ArchError,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    cli::{CompileArgs, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct CompileReport<'a> {
    session_id: String,
    dry_run: bool,
    rounds: u32,
    plugins: &'a [String],
    outcomes: &'a [WriteOutcome],
    diagnostics: Vec<&'a Diagnostic>,
    errors: usize,
    warnings: usize,
}

#[instrument(skip_all, fields(model = %args.model.display(), dry_run = args.dry_run))]
pub fn execute(args: CompileArgs, global: &GlobalArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let options = match &args.options {
        Some(path) => load_options(path)?,
        None => Options::new(),
    };
    let catalog = super::plugin_catalog(args.manifest.as_deref());

    let layout = config.generation.layout(args.out.as_deref());
    let filesystem: Box<dyn Filesystem> = if args.dry_run {
        Box::new(MemoryFilesystem::over(Arc::new(LocalFilesystem::new())))
    } else {
        Box::new(LocalFilesystem::new())
    };

    let mut host = JsonModelHost::open(&args.model)?;
    let session = CompilationSession::start(config.generation.session()).map_err(ArchError::from)?;
    info!(session = %session.id(), root = %layout.root().display(), "compilation started");

    let summary = PipelineOrchestrator::new(session, catalog, ArtifactWriter::new(filesystem, layout))
        .with_options(options)
        .fail_on_validation_errors(config.generation.fail_on_validation_errors && !args.lenient)
        .run(&mut host)?;

    report(&summary, args.dry_run, global.verbose > 0, &output)?;

    if summary.has_errors() {
        return Err(CliError::CompilationFailed {
            errors: summary.diagnostics.error_count(),
        });
    }
    Ok(())
}

fn report(summary: &CompilationSummary, dry_run: bool, verbose: bool, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(&CompileReport {
            session_id: summary.session_id.to_string(),
            dry_run,
            rounds: summary.rounds,
            plugins: &summary.plugins,
            outcomes: &summary.outcomes,
            diagnostics: summary.diagnostics.iter().collect(),
            errors: summary.diagnostics.error_count(),
            warnings: summary.diagnostics.warning_count(),
        });
    }

    for diagnostic in summary.diagnostics.iter() {
        output.diagnostic(diagnostic, verbose)?;
    }

    let width = summary
        .outcomes
        .iter()
        .map(|outcome| outcome.status.as_str().len())
        .max()
        .unwrap_or(0);
    for outcome in &summary.outcomes {
        output.print(&format!(
            "  {:<width$}  {}  ({})",
            status_label(outcome.status, dry_run),
            outcome.path.display(),
            outcome.plugin
        ))?;
    }

    let written = summary.written();
    let unchanged = count(summary, WriteStatus::Unchanged);
    let verb = if dry_run { "would write" } else { "wrote" };
    let line = format!(
        "{} round(s), {} plugin(s): {verb} {written} file(s), {unchanged} unchanged",
        summary.rounds,
        summary.plugins.len()
    );
    if summary.has_errors() {
        output.warning(&line)?;
    } else {
        output.success(&line)?;
    }
    Ok(())
}

fn status_label(status: WriteStatus, dry_run: bool) -> &'static str {
    match (status, dry_run) {
        (WriteStatus::Written, true) => "would write",
        (status, _) => status.as_str(),
    }
}

fn count(summary: &CompilationSummary, status: WriteStatus) -> usize {
    summary.outcomes.iter().filter(|outcome| outcome.status == status).count()
}
