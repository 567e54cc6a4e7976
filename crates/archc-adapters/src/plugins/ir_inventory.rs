//! `ir-inventory`: the round's IR as a JSON resource, for tooling and diffs.
//!
//! Options: `path` (a `{round}` placeholder is substituted, default
//! `archc/inventory-round-{round}.json`) and `pretty` (default `true`).

use archc_core::{
    application::{ApplicationError, Plugin, PluginContext, PluginMetadata, PluginOrder},
    domain::{GeneratedArtifact, IrSnapshot, MergeMode},
    error::ArchResult,
};
use serde::Serialize;

pub const ID: &str = "ir-inventory";

#[derive(Debug, Default)]
pub struct IrInventoryPlugin;

impl IrInventoryPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
struct Inventory<'a> {
    generator: &'static str,
    version: &'static str,
    counts: Counts,
    #[serde(flatten)]
    ir: &'a IrSnapshot,
}

#[derive(Debug, Serialize)]
struct Counts {
    types: usize,
    aggregate_roots: usize,
    relationships: usize,
    ports: usize,
    services: usize,
    unresolved: usize,
}

impl Counts {
    fn of(ir: &IrSnapshot) -> Self {
        Self {
            types: ir.domain().len(),
            aggregate_roots: ir.domain().aggregate_roots().count(),
            relationships: ir.domain().relationships().len(),
            ports: ir.ports().len(),
            services: ir.application().len(),
            unresolved: ir.unresolved().len(),
        }
    }
}

impl Plugin for IrInventoryPlugin {
    fn id(&self) -> &str {
        ID
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("IR inventory")
            .with_description("JSON dump of the classified models of each round")
            .with_version(archc_core::VERSION)
    }

    fn order(&self) -> PluginOrder {
        PluginOrder::Early
    }

    fn apply(&self, context: &mut PluginContext<'_>) -> ArchResult<()> {
        let options = context.options();
        let ir = context.ir();
        let path = options
            .string("path", "archc/inventory-round-{round}.json")
            .replace("{round}", &ir.round().to_string());

        let inventory = Inventory {
            generator: ID,
            version: archc_core::VERSION,
            counts: Counts::of(ir),
            ir,
        };
        let json = if options.bool("pretty", true) {
            serde_json::to_string_pretty(&inventory)
        } else {
            serde_json::to_string(&inventory)
        }
        .map_err(|e| ApplicationError::plugin_failed(ID, e.to_string()))?;

        let artifact = GeneratedArtifact::resource_file(path)
            .text(format!("{json}\n"))
            .merge_mode(MergeMode::Overwrite)
            .build()?;
        context.emit(artifact);
        Ok(())
    }
}
