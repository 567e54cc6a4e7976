//! `repository-stub`: an in-memory adapter skeleton for every driven
//! repository port.
//!
//! Every abstract method gets a body that throws, wrapped in a custom block
//! so hand-written implementations survive regeneration.

use std::collections::HashSet;

use archc_core::{
    application::{Plugin, PluginContext, PluginMetadata},
    domain::{ArtifactHeader, GeneratedArtifact, MergeMode, NamingConventions, Port, PortDirection, PortMethod},
    error::ArchResult,
};
use tracing::debug;

pub const ID: &str = "repository-stub";

#[derive(Debug, Default)]
pub struct RepositoryStubPlugin;

impl RepositoryStubPlugin {
    pub fn new() -> Self {
        Self
    }
}

struct StubOptions {
    prefix: String,
    subpackage: String,
    extension: String,
    skip: HashSet<String>,
}

impl Plugin for RepositoryStubPlugin {
    fn id(&self) -> &str {
        ID
    }

    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Repository stubs")
            .with_description("In-memory adapter skeletons for driven repository ports")
            .with_version(archc_core::VERSION)
    }

    fn apply(&self, context: &mut PluginContext<'_>) -> ArchResult<()> {
        let options = context.options();
        let settings = StubOptions {
            prefix: options.string("prefix", "InMemory"),
            subpackage: options.string("subpackage", "adapter"),
            extension: options.string("extension", "java"),
            skip: options.list("skip").into_iter().collect(),
        };
        let naming = context.naming();

        let ports: Vec<&Port> = context
            .ports()
            .ports()
            .iter()
            .filter(|port| port.direction() == PortDirection::Driven && port.is_repository())
            .collect();

        for port in ports {
            if settings.skip.contains(port.qualified_name()) {
                debug!(port = port.qualified_name(), "skipped by option");
                continue;
            }
            let artifact = stub_for(port, naming, &settings)?;
            context.emit(artifact);
        }
        Ok(())
    }
}

fn stub_for(port: &Port, naming: NamingConventions, settings: &StubOptions) -> ArchResult<GeneratedArtifact> {
    let class_name = naming.in_subpackage(
        &naming.prefixed(port.qualified_name(), &settings.prefix),
        &settings.subpackage,
    );
    let simple = naming.simple_name(&class_name);

    let mut lines = Vec::new();
    let package = naming.package_name(&class_name);
    if !package.is_empty() {
        lines.push(format!("package {package};"));
        lines.push(String::new());
    }
    lines.push(format!("public class {simple} implements {} {{", port.qualified_name()));

    let mut blocks = Vec::new();
    for method in port.methods().iter().filter(|m| m.is_abstract()) {
        let block = unique_block(naming.kebab_case(method.name()), &blocks);
        lines.push(String::new());
        lines.extend(method_stub(method, &block));
        blocks.push(block);
    }
    lines.push("}".into());

    let mut text = lines.join("\n");
    text.push('\n');

    let mut builder = GeneratedArtifact::source_file(class_name.as_str(), settings.extension.as_str())
        .text(text)
        .merge_mode(MergeMode::MergeCustomBlocks)
        .header(ArtifactHeader::new(ID));
    for block in blocks {
        builder = builder.custom_block(block);
    }
    Ok(builder.build()?)
}

fn method_stub(method: &PortMethod, block: &str) -> Vec<String> {
    let parameters: Vec<String> = method
        .parameters()
        .iter()
        .map(|p| format!("{} {}", p.type_ref, p.name))
        .collect();
    vec![
        "    @Override".into(),
        format!(
            "    public {} {}({}) {{",
            method.return_type(),
            method.name(),
            parameters.join(", ")
        ),
        format!("        // archc:custom-begin {block}"),
        format!(
            "        throw new UnsupportedOperationException(\"{}\");",
            method.name()
        ),
        format!("        // archc:custom-end {block}"),
        "    }".into(),
    ]
}

/// Overloads share a name; later ones get `-2`, `-3`, ...
fn unique_block(base: String, taken: &[String]) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::{apply, sample_ir};

    #[test]
    fn stub_per_repository_port() {
        let ir = sample_ir();
        let (artifacts, diagnostics) = apply(&RepositoryStubPlugin, &ir, &[]);

        assert!(diagnostics.is_empty());
        assert_eq!(artifacts.len(), 1);
        let stub = &artifacts[0].artifact;
        assert_eq!(
            stub.kind().relative_path(),
            std::path::PathBuf::from("com/acme/adapter/InMemoryCustomerRepository.java")
        );
        assert_eq!(stub.custom_blocks(), ["find-by-id".to_string(), "save".to_string()]);

        let text = stub.content().as_text().unwrap();
        assert!(text.starts_with("package com.acme.adapter;\n"));
        assert!(text.contains("public class InMemoryCustomerRepository implements com.acme.CustomerRepository {"));
        assert!(text.contains("public com.acme.Customer findById(com.acme.CustomerId id) {"));
        assert!(text.contains("// archc:custom-begin save"));
    }

    #[test]
    fn skip_option_suppresses_a_port() {
        let ir = sample_ir();
        let mut options = archc_core::application::Options::new();
        options.set(
            ID,
            "skip",
            archc_core::application::OptionValue::List(vec![archc_core::application::OptionValue::String(
                "com.acme.CustomerRepository".into(),
            )]),
        );
        let (artifacts, _) = crate::plugins::testing::apply_with(&RepositoryStubPlugin, &ir, &options);

        assert!(artifacts.is_empty());
    }

    #[test]
    fn overloads_get_numbered_blocks() {
        let taken = vec!["find".to_string(), "find-2".to_string()];
        assert_eq!(unique_block("find".into(), &taken), "find-3");
        assert_eq!(unique_block("save".into(), &taken), "save");
    }
}
