//! `archc plugins`: the plugins a compilation would run, in plan order.

use archc_core::{application::PluginExecutionPlan, domain::Diagnostics};
use serde::Serialize;

use crate::{
    cli::PluginsArgs,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct PluginRow {
    id: String,
    name: String,
    order: String,
    version: String,
    description: String,
}

pub fn execute(args: PluginsArgs, output: OutputManager) -> CliResult<()> {
    let catalog = super::plugin_catalog(args.manifest.as_deref());
    let mut diagnostics = Diagnostics::new();
    let plan = PluginExecutionPlan::build(catalog.discover().map_err(CliError::Core)?, &mut diagnostics);

    let rows: Vec<PluginRow> = plan
        .plugins()
        .iter()
        .map(|plugin| {
            let metadata = plugin.metadata();
            PluginRow {
                id: plugin.id().to_string(),
                name: metadata.name,
                order: plugin.order().to_string(),
                version: metadata.version,
                description: metadata.description,
            }
        })
        .collect();

    if output.is_json() {
        return output.json(&rows);
    }

    for diagnostic in diagnostics.iter() {
        output.diagnostic(diagnostic, false)?;
    }
    output.header("Plugins (in execution order):")?;
    let width = rows.iter().map(|row| row.id.len()).max().unwrap_or(0);
    for row in &rows {
        output.print(&format!("  {:<width$}  {:<6}  {}", row.id, row.order, row.description))?;
    }
    Ok(())
}
