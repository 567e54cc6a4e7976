//! `living-doc`: a Markdown page describing the domain and its ports.
//!
//! Each aggregate gets a custom block for hand-written notes, so the page can
//! be regenerated freely.
//!
//! | Option          | Default          |
//! |-----------------|------------------|
//! | `path`          | `domain.md`      |
//! | `title`         | `Domain model`   |
//! | `include-ports` | `true`           |

use std::collections::HashSet;

use archc_core::{
    application::{Plugin, PluginContext, PluginMetadata, PluginOrder},
    domain::{ArtifactHeader, DomainType, GeneratedArtifact, MergeMode, NamingConventions},
    error::ArchResult,
};

pub const ID: &str = "living-doc";

#[derive(Debug, Default)]
pub struct LivingDocPlugin;

impl LivingDocPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for LivingDocPlugin {
    fn id(&self) -> &str {
        ID
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Living documentation")
            .with_description("Markdown overview of aggregates, relationships, ports and services")
            .with_version(archc_core::VERSION)
    }

    fn order(&self) -> PluginOrder {
        PluginOrder::Late
    }

    fn apply(&self, context: &mut PluginContext<'_>) -> ArchResult<()> {
        let options = context.options();
        let path = options.string("path", "domain.md");
        let title = options.string("title", "Domain model");
        let include_ports = options.bool("include-ports", true);

        let page = Page::render(context, &title, include_ports);
        let mut builder = GeneratedArtifact::doc_file(path)
            .text(page.text)
            .merge_mode(MergeMode::MergeCustomBlocks)
            .header(ArtifactHeader::new(ID).with_notice("Edit only between custom-block markers."));
        for id in page.blocks {
            builder = builder.custom_block(id);
        }

        context.emit(builder.build()?);
        Ok(())
    }
}

struct Page {
    lines: Vec<String>,
    blocks: Vec<String>,
    text: String,
}

impl Page {
    fn render(context: &PluginContext<'_>, title: &str, include_ports: bool) -> Self {
        let naming = context.naming();
        let domain = context.domain();
        let mut page = Self {
            lines: vec![format!("# {title}"), String::new()],
            blocks: Vec::new(),
            text: String::new(),
        };

        page.lines.push("## Aggregates".into());
        page.lines.push(String::new());
        let mut used = HashSet::new();
        let mut roots = 0;
        for root in domain.aggregate_roots() {
            roots += 1;
            let id = unique_block_id(naming, root.qualified_name(), &mut used);
            page.aggregate(context, root, &id);
            page.blocks.push(id);
        }
        if roots == 0 {
            page.lines.push("_No aggregate roots._".into());
            page.lines.push(String::new());
        }

        let others: Vec<&DomainType> = domain.types().iter().filter(|t| !t.is_aggregate_root()).collect();
        if !others.is_empty() {
            page.lines.push("## Other domain types".into());
            page.lines.push(String::new());
            page.lines.push("| Type | Kind | Immutable |".into());
            page.lines.push("|------|------|-----------|".into());
            for other in others {
                page.lines.push(format!(
                    "| `{}` | {} | {} |",
                    other.qualified_name(),
                    other.kind(),
                    if other.is_immutable() { "yes" } else { "no" }
                ));
            }
            page.lines.push(String::new());
        }

        if include_ports {
            page.ports(context);
        }

        let mut text = page.lines.join("\n");
        text.push('\n');
        page.text = text;
        page
    }

    fn aggregate(&mut self, context: &PluginContext<'_>, root: &DomainType, block: &str) {
        let types = context.type_system();
        self.lines.push(format!("### {}", root.simple_name()));
        self.lines.push(String::new());
        self.lines.push(format!("`{}`", root.qualified_name()));
        if let Some(doc) = root.documentation() {
            self.lines.push(String::new());
            self.lines.push(doc.trim().to_string());
        }
        self.lines.push(String::new());

        if !root.properties().is_empty() {
            self.lines.push("| Property | Type | Identity |".into());
            self.lines.push("|----------|------|----------|".into());
            for property in root.properties() {
                self.lines.push(format!(
                    "| {} | `{}` | {} |",
                    property.name(),
                    types.render_simple(property.type_ref()),
                    if property.is_identity() { "yes" } else { "" }
                ));
            }
            self.lines.push(String::new());
        }

        let relationships: Vec<String> = context
            .domain()
            .relationships_of(root.qualified_name())
            .map(|r| {
                let via = if r.by_identifier { " (by id)" } else { "" };
                format!("- `{}` -> `{}`: {}{}", r.property, r.target, r.kind, via)
            })
            .collect();
        if !relationships.is_empty() {
            self.lines.extend(relationships);
            self.lines.push(String::new());
        }

        self.lines.push(format!("<!-- archc:custom-begin {block} -->"));
        self.lines.push("_Notes._".into());
        self.lines.push(format!("<!-- archc:custom-end {block} -->"));
        self.lines.push(String::new());
    }

    fn ports(&mut self, context: &PluginContext<'_>) {
        let ports = context.ports();
        if !ports.is_empty() {
            self.lines.push("## Ports".into());
            self.lines.push(String::new());
            self.lines.push("| Port | Direction | Methods | Manages |".into());
            self.lines.push("|------|-----------|---------|---------|".into());
            for port in ports.ports() {
                self.lines.push(format!(
                    "| `{}` | {} | {} | {} |",
                    port.qualified_name(),
                    port.direction(),
                    port.methods().len(),
                    port.managed_type().map(|t| format!("`{t}`")).unwrap_or_default()
                ));
            }
            self.lines.push(String::new());
        }

        let services = context.application().services();
        if !services.is_empty() {
            self.lines.push("## Application services".into());
            self.lines.push(String::new());
            for service in services {
                let implements = if service.implements().is_empty() {
                    String::new()
                } else {
                    format!(" implements {}", service.implements().join(", "))
                };
                self.lines.push(format!(
                    "- `{}`{} ({} operations)",
                    service.qualified_name(),
                    implements,
                    service.operations().len()
                ));
            }
            self.lines.push(String::new());
        }
    }
}

/// Simple-name block id, or the full name when two aggregates share one.
fn unique_block_id(naming: NamingConventions, qualified_name: &str, used: &mut HashSet<String>) -> String {
    let short = naming.block_id(qualified_name);
    if used.insert(short.clone()) {
        return short;
    }
    let long = naming.kebab_case(qualified_name);
    used.insert(long.clone());
    long
}
