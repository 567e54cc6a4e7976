//! WRITE phase: put generated artifacts on disk according to their merge
//! mode.
//!
//! | Mode                  | Target absent | Target present                              |
//! |-----------------------|---------------|---------------------------------------------|
//! | `OVERWRITE`           | write         | write unless byte-identical                 |
//! | `WRITE_ONCE`          | write         | keep                                        |
//! | `FAIL_IF_EXISTS`      | write         | ARCH-200, keep                              |
//! | `MERGE_CUSTOM_BLOCKS` | write         | splice block bodies; orphans -> ARCH-104    |
//!
//! Nothing here is fatal: every problem becomes a diagnostic and the next
//! artifact is written.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::{plugin::EmittedArtifact, ports::Filesystem};
use crate::domain::{
    CustomBlocks, Diagnostics, DiagnosticsFactory, GeneratedArtifact, MergeInput, MergeMode, OutputLayout,
    merge_custom_blocks,
};

/// What happened to one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Written,
    /// Identical content already on disk.
    Unchanged,
    /// `WRITE_ONCE` target already present.
    Kept,
    Conflict,
    Orphaned,
    Malformed,
    Undeclared,
    Duplicate,
    Failed,
}

impl WriteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Unchanged => "unchanged",
            Self::Kept => "kept",
            Self::Conflict => "conflict",
            Self::Orphaned => "orphaned",
            Self::Malformed => "malformed",
            Self::Undeclared => "undeclared",
            Self::Duplicate => "duplicate",
            Self::Failed => "failed",
        }
    }

    /// Whether the target now holds this artifact's content.
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::Written | Self::Unchanged)
    }
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub plugin: String,
    /// Relative to the output root.
    pub path: PathBuf,
    pub status: WriteStatus,
}

/// Owns the filesystem port and the output layout.
pub struct ArtifactWriter {
    filesystem: Box<dyn Filesystem>,
    layout: OutputLayout,
    factory: DiagnosticsFactory,
}

impl ArtifactWriter {
    pub fn new(filesystem: Box<dyn Filesystem>, layout: OutputLayout) -> Self {
        Self {
            filesystem,
            layout,
            factory: DiagnosticsFactory::new(),
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Write one round's artifacts. The first artifact for a target wins;
    /// later ones in the same batch are reported as ARCH-204.
    #[instrument(skip_all, fields(artifacts = artifacts.len(), root = %self.layout.root().display()))]
    pub fn write_all(&self, artifacts: &[EmittedArtifact], diagnostics: &mut Diagnostics) -> Vec<WriteOutcome> {
        let mut targets = HashSet::new();
        let mut outcomes = Vec::with_capacity(artifacts.len());

        for emitted in artifacts {
            let relative = self.layout.relative_target(&emitted.artifact);
            let shown = display_path(&relative);

            let status = if targets.insert(relative.clone()) {
                self.write_one(&emitted.artifact, &shown, diagnostics)
            } else {
                diagnostics.push(self.factory.duplicate_target(&shown));
                WriteStatus::Duplicate
            };
            debug!(plugin = %emitted.plugin, path = %shown, status = %status, "artifact processed");

            outcomes.push(WriteOutcome {
                plugin: emitted.plugin.clone(),
                path: relative,
                status,
            });
        }

        outcomes
    }

    fn write_one(&self, artifact: &GeneratedArtifact, shown: &str, diagnostics: &mut Diagnostics) -> WriteStatus {
        let target = self.layout.target(artifact);
        let rendered = artifact.rendered();

        if artifact.merge_mode() == MergeMode::MergeCustomBlocks {
            if let Some(status) = self.check_declared_blocks(artifact, &rendered, shown, diagnostics) {
                return status;
            }
        }

        if !self.filesystem.exists(&target) {
            return self.store(&target, &rendered, shown, diagnostics);
        }

        match artifact.merge_mode() {
            MergeMode::WriteOnce => WriteStatus::Kept,
            MergeMode::FailIfExists => {
                diagnostics.push(self.factory.write_conflict(shown));
                WriteStatus::Conflict
            }
            MergeMode::Overwrite => match self.read(&target, shown, diagnostics) {
                Some(existing) if existing == rendered => self.unchanged(shown, diagnostics),
                Some(_) => self.store(&target, &rendered, shown, diagnostics),
                None => WriteStatus::Failed,
            },
            MergeMode::MergeCustomBlocks => self.merge(&target, &rendered, shown, diagnostics),
        }
    }

    /// The markers in the rendered text must carry exactly the declared ids.
    fn check_declared_blocks(
        &self,
        artifact: &GeneratedArtifact,
        rendered: &[u8],
        shown: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<WriteStatus> {
        let text = String::from_utf8_lossy(rendered);
        let found = match CustomBlocks::parse(&text) {
            Ok(blocks) => blocks,
            Err(error) => {
                diagnostics.push(
                    self.factory
                        .malformed_custom_blocks(shown, &format!("generated content: {error}")),
                );
                return Some(WriteStatus::Malformed);
            }
        };

        let declared: BTreeSet<&str> = artifact.custom_blocks().iter().map(String::as_str).collect();
        let marked: BTreeSet<&str> = found.ids().into_iter().collect();
        let mismatched: Vec<&&str> = declared.symmetric_difference(&marked).collect();
        if mismatched.is_empty() {
            return None;
        }
        for id in mismatched {
            diagnostics.push(self.factory.undeclared_custom_block(shown, id));
        }
        Some(WriteStatus::Undeclared)
    }

    fn merge(&self, target: &Path, rendered: &[u8], shown: &str, diagnostics: &mut Diagnostics) -> WriteStatus {
        let Some(existing) = self.read(target, shown, diagnostics) else {
            return WriteStatus::Failed;
        };
        let Ok(existing_text) = String::from_utf8(existing) else {
            diagnostics.push(
                self.factory
                    .malformed_custom_blocks(shown, "existing file is not valid UTF-8"),
            );
            return WriteStatus::Malformed;
        };
        let generated = String::from_utf8_lossy(rendered);

        let outcome = match merge_custom_blocks(&generated, &existing_text) {
            Ok(outcome) => outcome,
            Err((input, error)) => {
                let side = match input {
                    MergeInput::Generated => "generated content",
                    MergeInput::Existing => "existing file",
                };
                diagnostics.push(
                    self.factory
                        .malformed_custom_blocks(shown, &format!("{side}: {error}")),
                );
                return WriteStatus::Malformed;
            }
        };

        if outcome.has_orphans() {
            for id in &outcome.orphaned {
                diagnostics.push(self.factory.orphaned_custom_block(shown, id));
            }
            return WriteStatus::Orphaned;
        }
        if outcome.text == existing_text {
            return self.unchanged(shown, diagnostics);
        }
        debug!(path = shown, preserved = outcome.preserved.len(), "custom blocks merged");
        self.store(target, outcome.text.as_bytes(), shown, diagnostics)
    }

    fn read(&self, target: &Path, shown: &str, diagnostics: &mut Diagnostics) -> Option<Vec<u8>> {
        match self.filesystem.read_file(target) {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn!(path = shown, error = %error, "existing artifact unreadable");
                diagnostics.push(self.factory.write_failed(shown, &error.to_string()));
                None
            }
        }
    }

    fn store(&self, target: &Path, content: &[u8], shown: &str, diagnostics: &mut Diagnostics) -> WriteStatus {
        let written = match target.parent() {
            Some(parent) => self.filesystem.create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| self.filesystem.write_file(target, content));

        match written {
            Ok(()) => {
                diagnostics.push(self.factory.artifact_written(shown));
                WriteStatus::Written
            }
            Err(error) => {
                warn!(path = shown, error = %error, "artifact write failed");
                diagnostics.push(self.factory.write_failed(shown, &error.to_string()));
                WriteStatus::Failed
            }
        }
    }

    fn unchanged(&self, shown: &str, diagnostics: &mut Diagnostics) -> WriteStatus {
        diagnostics.push(self.factory.artifact_unchanged(shown));
        WriteStatus::Unchanged
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{ArchError, ArchResult};

    /// Map-backed filesystem shared between a test and the writer.
    #[derive(Debug, Clone, Default)]
    pub struct MapFilesystem {
        pub files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
    }

    impl MapFilesystem {
        pub fn text(&self, path: &str) -> Option<String> {
            let files = self.files.lock().ok()?;
            files
                .get(Path::new(path))
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        }

        pub fn put(&self, path: &str, content: &str) {
            if let Ok(mut files) = self.files.lock() {
                files.insert(PathBuf::from(path), content.as_bytes().to_vec());
            }
        }
    }

    impl Filesystem for MapFilesystem {
        fn create_dir_all(&self, _path: &Path) -> ArchResult<()> {
            Ok(())
        }

        fn read_file(&self, path: &Path) -> ArchResult<Vec<u8>> {
            let files = self.files.lock().map_err(|_| ArchError::internal("poisoned"))?;
            files
                .get(path)
                .cloned()
                .ok_or_else(|| ArchError::internal(format!("no file {}", path.display())))
        }

        fn write_file(&self, path: &Path, content: &[u8]) -> ArchResult<()> {
            let mut files = self.files.lock().map_err(|_| ArchError::internal("poisoned"))?;
            files.insert(path.to_path_buf(), content.to_vec());
            Ok(())
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.lock().is_ok_and(|files| files.contains_key(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MapFilesystem;
    use super::*;
    use crate::domain::codes;

    const DOC: &str = "out/docs/orders.md";

    fn writer(fs: &MapFilesystem) -> ArtifactWriter {
        ArtifactWriter::new(Box::new(fs.clone()), OutputLayout::new("out"))
    }

    fn emitted(artifact: GeneratedArtifact) -> EmittedArtifact {
        EmittedArtifact {
            plugin: "living-doc".into(),
            artifact,
        }
    }

    fn doc(text: &str, mode: MergeMode) -> EmittedArtifact {
        emitted(GeneratedArtifact::doc_file("orders.md").text(text).merge_mode(mode).build().unwrap())
    }

    fn merged_doc(notes: &str) -> EmittedArtifact {
        let text = format!(
            "# Orders\n<!-- archc:custom-begin notes -->\n{notes}<!-- archc:custom-end notes -->\n"
        );
        emitted(
            GeneratedArtifact::doc_file("orders.md")
                .text(text)
                .merge_mode(MergeMode::MergeCustomBlocks)
                .custom_block("notes")
                .build()
                .unwrap(),
        )
    }

    fn write(fs: &MapFilesystem, artifact: EmittedArtifact) -> (WriteStatus, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let outcomes = writer(fs).write_all(&[artifact], &mut diagnostics);
        (outcomes[0].status, diagnostics)
    }

    // ========================================================================
    // Plain modes
    // ========================================================================

    #[test]
    fn overwrite_writes_then_reports_unchanged() {
        let fs = MapFilesystem::default();

        let (first, diagnostics) = write(&fs, doc("v1\n", MergeMode::Overwrite));
        assert_eq!(first, WriteStatus::Written);
        assert_eq!(diagnostics.with_code(&codes::artifact_written()).count(), 1);

        let (second, diagnostics) = write(&fs, doc("v1\n", MergeMode::Overwrite));
        assert_eq!(second, WriteStatus::Unchanged);
        assert_eq!(diagnostics.with_code(&codes::artifact_unchanged()).count(), 1);

        let (third, _) = write(&fs, doc("v2\n", MergeMode::Overwrite));
        assert_eq!(third, WriteStatus::Written);
        assert_eq!(fs.text(DOC).as_deref(), Some("v2\n"));
    }

    #[test]
    fn write_once_keeps_existing_file() {
        let fs = MapFilesystem::default();
        fs.put(DOC, "hand written\n");

        let (status, diagnostics) = write(&fs, doc("generated\n", MergeMode::WriteOnce));

        assert_eq!(status, WriteStatus::Kept);
        assert!(diagnostics.is_empty());
        assert_eq!(fs.text(DOC).as_deref(), Some("hand written\n"));
    }

    #[test]
    fn fail_if_exists_reports_conflict() {
        let fs = MapFilesystem::default();
        fs.put(DOC, "hand written\n");

        let (status, diagnostics) = write(&fs, doc("generated\n", MergeMode::FailIfExists));

        assert_eq!(status, WriteStatus::Conflict);
        assert!(diagnostics.has_errors());
        assert_eq!(fs.text(DOC).as_deref(), Some("hand written\n"));
    }

    #[test]
    fn second_artifact_for_a_target_is_dropped() {
        let fs = MapFilesystem::default();
        let mut diagnostics = Diagnostics::new();
        let outcomes = writer(&fs).write_all(
            &[doc("a\n", MergeMode::Overwrite), doc("b\n", MergeMode::Overwrite)],
            &mut diagnostics,
        );

        assert_eq!(outcomes[1].status, WriteStatus::Duplicate);
        assert_eq!(diagnostics.with_code(&codes::duplicate_target()).count(), 1);
        assert_eq!(fs.text(DOC).as_deref(), Some("a\n"));
    }

    // ========================================================================
    // Custom blocks
    // ========================================================================

    #[test]
    fn merge_preserves_user_content() {
        let fs = MapFilesystem::default();
        fs.put(
            DOC,
            "# Old title\n<!-- archc:custom-begin notes -->\nmine\n<!-- archc:custom-end notes -->\n",
        );

        let (status, _) = write(&fs, merged_doc("TODO\n"));

        assert_eq!(status, WriteStatus::Written);
        assert_eq!(
            fs.text(DOC).as_deref(),
            Some("# Orders\n<!-- archc:custom-begin notes -->\nmine\n<!-- archc:custom-end notes -->\n")
        );
        let (again, _) = write(&fs, merged_doc("TODO\n"));
        assert_eq!(again, WriteStatus::Unchanged);
    }

    #[test]
    fn orphaned_block_leaves_file_untouched() {
        let fs = MapFilesystem::default();
        let existing = "<!-- archc:custom-begin legacy -->\nkeep me\n<!-- archc:custom-end legacy -->\n";
        fs.put(DOC, existing);

        let (status, diagnostics) = write(&fs, merged_doc("\n"));

        assert_eq!(status, WriteStatus::Orphaned);
        let orphaned_custom_block_code = codes::orphaned_custom_block();
        let orphan = diagnostics.with_code(&orphaned_custom_block_code).next().unwrap();
        assert!(orphan.message().contains("legacy"));
        assert_eq!(fs.text(DOC).as_deref(), Some(existing));
    }

    #[test]
    fn malformed_existing_markers_skip_the_write() {
        let fs = MapFilesystem::default();
        fs.put(DOC, "<!-- archc:custom-begin notes -->\nunterminated\n");

        let (status, diagnostics) = write(&fs, merged_doc("\n"));

        assert_eq!(status, WriteStatus::Malformed);
        assert_eq!(diagnostics.with_code(&codes::malformed_custom_blocks()).count(), 1);
    }

    #[test]
    fn undeclared_block_is_rejected_before_touching_disk() {
        let fs = MapFilesystem::default();
        let artifact = GeneratedArtifact::doc_file("orders.md")
            .text("<!-- archc:custom-begin extra -->\n<!-- archc:custom-end extra -->\n")
            .merge_mode(MergeMode::MergeCustomBlocks)
            .build()
            .unwrap();

        let (status, diagnostics) = write(&fs, emitted(artifact));

        assert_eq!(status, WriteStatus::Undeclared);
        assert_eq!(diagnostics.with_code(&codes::undeclared_custom_block()).count(), 1);
        assert!(fs.text(DOC).is_none());
    }
}
