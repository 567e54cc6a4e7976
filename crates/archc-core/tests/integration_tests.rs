//! Integration tests for archc-core: whole compilations through the public
//! API, with in-test host, filesystem and plugins.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use archc_core::{
    application::ApplicationError,
    domain::{AnnotationFact, ElementKind, FieldFact, MethodFact, TypeReference, codes},
    prelude::*,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone, Default)]
struct SharedFs {
    files: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl SharedFs {
    fn text(&self, path: &str) -> Option<String> {
        let files = self.files.lock().unwrap();
        files.get(Path::new(path)).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn put(&self, path: &str, text: &str) {
        self.files.lock().unwrap().insert(PathBuf::from(path), text.as_bytes().to_vec());
    }

    fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

impl Filesystem for SharedFs {
    fn create_dir_all(&self, _path: &Path) -> ArchResult<()> {
        Ok(())
    }

    fn read_file(&self, path: &Path) -> ArchResult<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "no such file").into())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> ArchResult<()> {
        self.files.lock().unwrap().insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

struct Rounds(std::vec::IntoIter<Round>);

impl Rounds {
    fn new(rounds: Vec<Round>) -> Self {
        Self(rounds.into_iter())
    }
}

impl SourceHost for Rounds {
    fn next_round(&mut self) -> ArchResult<Option<Round>> {
        Ok(self.0.next())
    }
}

struct Catalog(Vec<Arc<dyn Plugin>>);

impl PluginCatalog for Catalog {
    fn discover(&self) -> ArchResult<Vec<Arc<dyn Plugin>>> {
        Ok(self.0.clone())
    }
}

/// One markdown page per round listing its aggregate roots, with a notes block.
struct RootList;

impl Plugin for RootList {
    fn id(&self) -> &str {
        "root-list"
    }

    fn apply(&self, context: &mut PluginContext<'_>) -> ArchResult<()> {
        let heading = context.options().string("heading", "Roots");
        let mut text = format!("# {heading}\n");
        for root in context.domain().aggregate_roots() {
            text.push_str(&format!("- {}\n", root.qualified_name()));
        }
        text.push_str("<!-- archc:custom-begin notes -->\n<!-- archc:custom-end notes -->\n");

        let artifact = GeneratedArtifact::doc_file(format!("roots-{}.md", context.ir().round()))
            .text(text)
            .merge_mode(MergeMode::MergeCustomBlocks)
            .custom_block("notes")
            .build()?;
        context.emit(artifact);
        Ok(())
    }
}

struct Broken;

impl Plugin for Broken {
    fn id(&self) -> &str {
        "broken"
    }

    fn apply(&self, _context: &mut PluginContext<'_>) -> ArchResult<()> {
        Err(ApplicationError::plugin_failed("broken", "out of ink").into())
    }
}

fn parse(input: &str) -> TypeReference {
    TypeReference::parse(input).unwrap()
}

fn root(qualified_name: &str, identity: &str) -> SourceElement {
    SourceElement::new(ElementKind::Class, qualified_name)
        .with_annotation(AnnotationFact::new("org.jmolecules.ddd.annotation.AggregateRoot"))
        .with_field(FieldFact::new("id", parse(identity)))
}

fn identifier(qualified_name: &str) -> SourceElement {
    SourceElement::new(ElementKind::Record, qualified_name).with_field(FieldFact::new("value", parse("long")))
}

fn compile(fs: &SharedFs, plugins: Vec<Arc<dyn Plugin>>, rounds: Vec<Round>, fail: bool) -> CompilationSummary {
    let session = CompilationSession::start(SessionConfig::default()).unwrap();
    let writer = ArtifactWriter::new(Box::new(fs.clone()), OutputLayout::new("out"));
    PipelineOrchestrator::new(session, Box::new(Catalog(plugins)), writer)
        .fail_on_validation_errors(fail)
        .run(&mut Rounds::new(rounds))
        .unwrap()
}

// ============================================================================
// Rounds
// ============================================================================

#[test]
fn each_round_generates_from_everything_seen_so_far() {
    let fs = SharedFs::default();
    let rounds = vec![
        Round::new(1, vec![root("com.acme.Order", "com.acme.OrderId"), identifier("com.acme.OrderId")]),
        Round::new(2, vec![root("com.acme.Invoice", "com.acme.InvoiceId"), identifier("com.acme.InvoiceId")]),
        Round::last(3, Vec::new()),
    ];
    let summary = compile(&fs, vec![Arc::new(RootList)], rounds, true);

    assert!(!summary.has_errors(), "{:?}", summary.diagnostics);
    assert_eq!(summary.rounds, 3);
    assert_eq!(summary.plugins, vec!["root-list"]);

    let first = fs.text("out/docs/roots-1.md").unwrap();
    assert!(first.contains("- com.acme.Order\n"));
    assert!(!first.contains("Invoice"));
    let second = fs.text("out/docs/roots-2.md").unwrap();
    assert!(second.contains("- com.acme.Invoice\n"));
    assert!(second.contains("- com.acme.Order\n"));

    assert_eq!(summary.written(), 2);
    assert_eq!(summary.diagnostics.with_code(&codes::round_analyzed()).count(), 2);
    assert_eq!(summary.diagnostics.with_code(&codes::compilation_finished()).count(), 1);
}

#[test]
fn batching_does_not_change_classification() {
    let customer = || {
        SourceElement::new(ElementKind::Class, "com.acme.Customer")
            .with_field(FieldFact::new("id", parse("com.acme.CustomerId")))
    };
    let repository = || SourceElement::new(ElementKind::Interface, "com.acme.CustomerRepository");

    let fs = SharedFs::default();
    let together = compile(&fs, vec![Arc::new(RootList)], vec![Round::last(1, vec![customer(), repository()])], true);
    let split = compile(
        &fs,
        vec![Arc::new(RootList)],
        vec![Round::new(1, vec![customer()]), Round::last(2, vec![repository()])],
        true,
    );

    assert!(fs.text("out/docs/roots-1.md").is_some());
    assert!(fs.text("out/docs/roots-2.md").unwrap().contains("- com.acme.Customer\n"));
    assert_eq!(together.diagnostics.with_code(&codes::kind_changed()).count(), 0);
    assert_eq!(split.diagnostics.with_code(&codes::kind_changed()).count(), 1);
}

#[test]
fn empty_host_still_finishes() {
    let fs = SharedFs::default();
    let summary = compile(&fs, vec![Arc::new(RootList)], Vec::new(), true);

    assert!(summary.outcomes.is_empty());
    assert_eq!(fs.len(), 0);
    assert_eq!(summary.diagnostics.with_code(&codes::compilation_finished()).count(), 1);
}

// ============================================================================
// Validation gate
// ============================================================================

fn cross_reference_round() -> Vec<Round> {
    let order = root("com.acme.Order", "com.acme.OrderId")
        .with_field(FieldFact::new("customer", parse("com.acme.Customer")));
    vec![Round::last(
        1,
        vec![
            order,
            identifier("com.acme.OrderId"),
            root("com.acme.Customer", "com.acme.CustomerId"),
            identifier("com.acme.CustomerId"),
        ],
    )]
}

#[test]
fn validation_errors_block_generation() {
    let fs = SharedFs::default();
    let summary = compile(&fs, vec![Arc::new(RootList)], cross_reference_round(), true);

    assert!(summary.has_errors());
    assert_eq!(summary.diagnostics.with_code(&codes::inter_aggregate_reference()).count(), 1);
    assert_eq!(summary.diagnostics.with_code(&codes::generation_skipped()).count(), 1);
    assert_eq!(fs.len(), 0);
}

#[test]
fn lenient_compilation_generates_anyway() {
    let fs = SharedFs::default();
    let summary = compile(&fs, vec![Arc::new(RootList)], cross_reference_round(), false);

    assert!(summary.has_errors());
    assert!(fs.text("out/docs/roots-1.md").is_some());
}

// ============================================================================
// Plugins and merging
// ============================================================================

#[test]
fn failing_plugin_does_not_stop_the_others() {
    let fs = SharedFs::default();
    let rounds = vec![Round::last(1, vec![root("com.acme.Order", "com.acme.OrderId"), identifier("com.acme.OrderId")])];
    let summary = compile(&fs, vec![Arc::new(Broken), Arc::new(RootList)], rounds, true);

    let plugin_failed_code = codes::plugin_failed();
    let failure = summary.diagnostics.with_code(&plugin_failed_code).next().unwrap();
    assert!(failure.message().contains("out of ink"));
    assert!(fs.text("out/docs/roots-1.md").is_some());
}

#[test]
fn user_notes_survive_recompilation() {
    let fs = SharedFs::default();
    let model = || vec![Round::last(1, vec![root("com.acme.Order", "com.acme.OrderId"), identifier("com.acme.OrderId")])];
    compile(&fs, vec![Arc::new(RootList)], model(), true);

    let edited = fs.text("out/docs/roots-1.md").unwrap().replace(
        "<!-- archc:custom-begin notes -->\n",
        "<!-- archc:custom-begin notes -->\nOrders are immutable once paid.\n",
    );
    fs.put("out/docs/roots-1.md", &edited);

    let summary = compile(&fs, vec![Arc::new(RootList)], model(), true);
    assert_eq!(summary.outcomes[0].status, WriteStatus::Unchanged);
    assert!(fs.text("out/docs/roots-1.md").unwrap().contains("Orders are immutable once paid.\n"));
}

#[test]
fn options_are_scoped_to_their_plugin() {
    let fs = SharedFs::default();
    let mut options = Options::new();
    options.set("root-list", "heading", OptionValue::String("Aggregates".into()));
    options.set("other", "heading", OptionValue::String("Ignored".into()));

    let session = CompilationSession::start(SessionConfig::default()).unwrap();
    let writer = ArtifactWriter::new(Box::new(fs.clone()), OutputLayout::new("out"));
    PipelineOrchestrator::new(session, Box::new(Catalog(vec![Arc::new(RootList)])), writer)
        .with_options(options)
        .run(&mut Rounds::new(vec![Round::last(1, vec![SourceElement::new(ElementKind::Enum, "com.acme.Status")
            .with_method(MethodFact::new("label", parse("java.lang.String")))])]))
        .unwrap();

    assert!(fs.text("out/docs/roots-1.md").unwrap().starts_with("# Aggregates\n"));
}
