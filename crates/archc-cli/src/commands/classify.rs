//! `archc classify`: run ANALYZE and VALIDATE only and show the verdicts.
//!
//! Every round the host delivers is folded into one source set and the set is
//! analyzed once, so the verdicts are those of the final compilation round.

use std::fmt;

use archc_adapters::JsonModelHost;
use archc_core::{
    application::{Analyzer, SourceHost, Validator},
    domain::{Diagnostic, Diagnostics, Evidence, IrSnapshot, Round, SourceSet},
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    cli::{ClassifyArgs, GlobalArgs},
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ClassifyReport<'a> {
    rounds: u32,
    ir: Option<&'a IrSnapshot>,
    diagnostics: Vec<&'a Diagnostic>,
}

#[instrument(skip_all, fields(model = %args.model.display()))]
pub fn execute(args: ClassifyArgs, global: &GlobalArgs, output: OutputManager) -> CliResult<()> {
    let mut host = JsonModelHost::open(&args.model)?;
    let mut sources = SourceSet::new();
    let mut last = Round::default();
    let mut rounds = 0;

    while let Some(round) = host.next_round()? {
        rounds += 1;
        sources.absorb(&round);
        last = round;
    }

    let mut diagnostics = Diagnostics::new();
    let ir = if sources.is_empty() {
        None
    } else {
        let ir = Analyzer::new().analyze(&sources.as_round(&last), &mut diagnostics)?;
        diagnostics.extend(Validator::new().validate(&ir));
        Some(ir)
    };

    if output.is_json() {
        output.json(&ClassifyReport {
            rounds,
            ir: ir.as_ref(),
            diagnostics: diagnostics.iter().collect(),
        })?;
    } else {
        for diagnostic in diagnostics.iter() {
            output.diagnostic(diagnostic, global.verbose > 0)?;
        }
        match &ir {
            Some(ir) => print_snapshot(ir, rounds, args.explain, &output)?,
            None => output.print("No source elements.")?,
        }
    }

    if diagnostics.has_errors() {
        return Err(CliError::CompilationFailed {
            errors: diagnostics.error_count(),
        });
    }
    Ok(())
}

fn print_snapshot(ir: &IrSnapshot, rounds: u32, explain: bool, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Model after {rounds} round(s)"))?;

    if !ir.domain().is_empty() {
        output.print("  Domain types:")?;
        for domain_type in ir.domain().types() {
            output.print(&format!("    {:<16} {}", domain_type.kind().as_str(), domain_type.qualified_name()))?;
            if let (true, Some(evidence)) = (explain, domain_type.evidence()) {
                print_evidence(evidence, output)?;
            }
        }
    }

    if !ir.ports().is_empty() {
        output.print("  Ports:")?;
        for port in ir.ports().ports() {
            let managed = port.managed_type().map(|t| format!(" manages {t}")).unwrap_or_default();
            output.print(&format!("    {:<16} {}{managed}", port.direction().as_str(), port.qualified_name()))?;
            if let (true, Some(evidence)) = (explain, port.evidence()) {
                print_evidence(evidence, output)?;
            }
        }
    }

    for unresolved in ir.unresolved() {
        output.print(&format!("    {:<16} {}", "UNRESOLVED", unresolved.qualified_name))?;
        if explain {
            print_evidence(&unresolved.evidence, output)?;
        }
    }

    if !ir.application().is_empty() {
        output.print("  Application services:")?;
        for service in ir.application().services() {
            output.print(&format!(
                "    {} ({} operations)",
                service.qualified_name(),
                service.operations().len()
            ))?;
        }
    }
    Ok(())
}

/// The full trail: every signal, present or absent, then the notes.
fn print_evidence<V>(evidence: &Evidence<V>, output: &OutputManager) -> CliResult<()>
where
    V: Copy + PartialEq + fmt::Display,
{
    output.print(&format!("        because {}", evidence.summary()))?;
    for signal in evidence.signals().iter().chain(evidence.prerequisites()) {
        let vote = signal.vote.map(|v| format!(" => {v}")).unwrap_or_default();
        let mark = if signal.is_present() { '+' } else { '-' };
        output.print(&format!("        {mark} {}: {}{vote}", signal.detector, signal.justification))?;
    }
    for note in evidence.notes() {
        output.print(&format!("        note: {note}"))?;
    }
    Ok(())
}
