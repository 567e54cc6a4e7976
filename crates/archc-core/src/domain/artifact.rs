//! Generated artifacts, their merge policy, headers and output layout.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::domain::error::DomainError;

/// How a generated artifact treats a file already present at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeMode {
    #[default]
    Overwrite,
    WriteOnce,
    FailIfExists,
    MergeCustomBlocks,
}

impl MergeMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Overwrite => "OVERWRITE",
            Self::WriteOnce => "WRITE_ONCE",
            Self::FailIfExists => "FAIL_IF_EXISTS",
            Self::MergeCustomBlocks => "MERGE_CUSTOM_BLOCKS",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `/`-separated path that stays below its output root.
///
/// Absolute paths and `..` segments are rejected at construction, so an
/// artifact can never be written outside the directory it is laid out in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ArtifactPath(String);

impl ArtifactPath {
    pub fn try_new(path: impl Into<String>) -> Result<Self, DomainError> {
        let path = path.into().replace('\\', "/");
        let invalid = |reason: &str| DomainError::InvalidArtifact(format!("path '{path}' {reason}"));

        if path.is_empty() {
            return Err(DomainError::MissingRequiredField { field: "artifact.path" });
        }
        if path.starts_with('/') || Path::new(&path).is_absolute() {
            return Err(invalid("is absolute"));
        }
        if path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(invalid("has an empty, '.' or '..' segment"));
        }

        Ok(Self(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.0.split('/').collect()
    }

    pub fn extension(&self) -> Option<&str> {
        let file_name = self.0.rsplit('/').next()?;
        file_name.rsplit_once('.').map(|(_, extension)| extension)
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an artifact is, and therefore where it lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Placed under the sources root at the path of its qualified name.
    SourceFile {
        qualified_name: String,
        extension: String,
    },
    ResourceFile { path: ArtifactPath },
    DocFile { path: ArtifactPath },
}

impl ArtifactKind {
    /// Path relative to the root of this kind.
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::SourceFile {
                qualified_name,
                extension,
            } => {
                let mut path: PathBuf = qualified_name.split('.').collect();
                path.set_extension(extension);
                path
            }
            Self::ResourceFile { path } | Self::DocFile { path } => path.to_path_buf(),
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match self {
            Self::SourceFile { extension, .. } => Some(extension),
            Self::ResourceFile { path } | Self::DocFile { path } => path.extension(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContent {
    Text(String),
    Bytes(Vec<u8>),
}

impl ArtifactContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Comment syntax used for headers, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Line(&'static str),
    Block(&'static str, &'static str),
    /// Formats without comments (JSON) get no header.
    Unsupported,
}

impl CommentStyle {
    pub fn for_extension(extension: Option<&str>) -> Self {
        match extension.unwrap_or_default() {
            "java" | "kt" | "kts" | "scala" | "groovy" | "rs" | "ts" | "js" | "go" | "cs" => {
                Self::Line("//")
            }
            "md" | "html" | "xml" => Self::Block("<!--", "-->"),
            "properties" | "yaml" | "yml" | "toml" | "py" | "sh" => Self::Line("#"),
            "sql" => Self::Line("--"),
            _ => Self::Unsupported,
        }
    }

    pub fn wrap(&self, text: &str) -> Option<String> {
        match self {
            Self::Line(prefix) => Some(format!("{prefix} {text}")),
            Self::Block(open, close) => Some(format!("{open} {text} {close}")),
            Self::Unsupported => None,
        }
    }
}

/// Header rendered at the top of text artifacts. Carries no timestamp, so
/// regenerating identical input yields identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactHeader {
    generator: String,
    notice: Option<String>,
}

impl ArtifactHeader {
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
            notice: None,
        }
    }

    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    pub fn generator(&self) -> &str {
        &self.generator
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn render(&self, style: CommentStyle) -> Option<String> {
        let mut lines = vec![style.wrap(&format!("Generated by archc ({})", self.generator))?];
        if let Some(notice) = &self.notice {
            lines.push(style.wrap(notice)?);
        }
        let mut rendered = lines.join("\n");
        rendered.push('\n');
        Some(rendered)
    }
}

/// One file produced by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    kind: ArtifactKind,
    content: ArtifactContent,
    merge_mode: MergeMode,
    custom_blocks: Vec<String>,
    header: Option<ArtifactHeader>,
}

impl GeneratedArtifact {
    pub fn source_file(qualified_name: impl Into<String>, extension: impl Into<String>) -> ArtifactBuilder {
        ArtifactBuilder::new(Pending::Source(qualified_name.into(), extension.into()))
    }

    pub fn resource_file(path: impl Into<String>) -> ArtifactBuilder {
        ArtifactBuilder::new(Pending::Resource(path.into()))
    }

    pub fn doc_file(path: impl Into<String>) -> ArtifactBuilder {
        ArtifactBuilder::new(Pending::Doc(path.into()))
    }

    pub fn kind(&self) -> &ArtifactKind {
        &self.kind
    }

    pub fn content(&self) -> &ArtifactContent {
        &self.content
    }

    pub fn merge_mode(&self) -> MergeMode {
        self.merge_mode
    }

    /// Block ids the generator declares; empty when it declares none.
    pub fn custom_blocks(&self) -> &[String] {
        &self.custom_blocks
    }

    pub fn header(&self) -> Option<&ArtifactHeader> {
        self.header.as_ref()
    }

    /// Final bytes: the header (when the format has comments) followed by
    /// the content.
    pub fn rendered(&self) -> Vec<u8> {
        match &self.content {
            ArtifactContent::Bytes(bytes) => bytes.clone(),
            ArtifactContent::Text(text) => self.rendered_text(text).into_bytes(),
        }
    }

    fn rendered_text(&self, text: &str) -> String {
        let header = self
            .header
            .as_ref()
            .and_then(|header| header.render(CommentStyle::for_extension(self.kind.extension())));
        match header {
            Some(header) => format!("{header}{text}"),
            None => text.to_string(),
        }
    }
}

#[derive(Debug)]
enum Pending {
    Source(String, String),
    Resource(String),
    Doc(String),
}

#[derive(Debug)]
pub struct ArtifactBuilder {
    kind: Pending,
    content: Option<ArtifactContent>,
    merge_mode: MergeMode,
    custom_blocks: Vec<String>,
    header: Option<ArtifactHeader>,
}

impl ArtifactBuilder {
    fn new(kind: Pending) -> Self {
        Self {
            kind,
            content: None,
            merge_mode: MergeMode::default(),
            custom_blocks: Vec::new(),
            header: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.content = Some(ArtifactContent::Text(text.into()));
        self
    }

    pub fn bytes(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.content = Some(ArtifactContent::Bytes(bytes.into()));
        self
    }

    pub fn merge_mode(mut self, merge_mode: MergeMode) -> Self {
        self.merge_mode = merge_mode;
        self
    }

    pub fn custom_block(mut self, id: impl Into<String>) -> Self {
        self.custom_blocks.push(id.into());
        self
    }

    pub fn header(mut self, header: ArtifactHeader) -> Self {
        self.header = Some(header);
        self
    }

    pub fn build(self) -> Result<GeneratedArtifact, DomainError> {
        let kind = match self.kind {
            Pending::Source(qualified_name, extension) => {
                if qualified_name.is_empty() {
                    return Err(DomainError::MissingRequiredField {
                        field: "artifact.qualified_name",
                    });
                }
                if qualified_name.split('.').any(str::is_empty) {
                    return Err(DomainError::InvalidName {
                        name: qualified_name,
                        reason: "qualified names cannot have empty segments".into(),
                    });
                }
                if extension.is_empty() || extension.contains(['.', '/']) {
                    return Err(DomainError::InvalidArtifact(format!(
                        "'{extension}' is not a file extension"
                    )));
                }
                ArtifactKind::SourceFile {
                    qualified_name,
                    extension,
                }
            }
            Pending::Resource(path) => ArtifactKind::ResourceFile {
                path: ArtifactPath::try_new(path)?,
            },
            Pending::Doc(path) => ArtifactKind::DocFile {
                path: ArtifactPath::try_new(path)?,
            },
        };

        let content = self
            .content
            .ok_or(DomainError::MissingRequiredField { field: "artifact.content" })?;
        if matches!(content, ArtifactContent::Bytes(_)) && self.merge_mode == MergeMode::MergeCustomBlocks {
            return Err(DomainError::InvalidArtifact(
                "binary content cannot merge custom blocks".into(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for id in &self.custom_blocks {
            if !seen.insert(id.as_str()) {
                return Err(DomainError::DuplicateMember {
                    owner: kind.relative_path().display().to_string(),
                    member: id.clone(),
                });
            }
        }

        Ok(GeneratedArtifact {
            kind,
            content,
            merge_mode: self.merge_mode,
            custom_blocks: self.custom_blocks,
            header: self.header,
        })
    }
}

/// Roots the three artifact kinds are laid out under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    sources: PathBuf,
    resources: PathBuf,
    docs: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sources: PathBuf::from("sources"),
            resources: PathBuf::from("resources"),
            docs: PathBuf::from("docs"),
        }
    }

    pub fn with_sources(mut self, sources: impl Into<PathBuf>) -> Self {
        self.sources = sources.into();
        self
    }

    pub fn with_resources(mut self, resources: impl Into<PathBuf>) -> Self {
        self.resources = resources.into();
        self
    }

    pub fn with_docs(mut self, docs: impl Into<PathBuf>) -> Self {
        self.docs = docs.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Target path relative to the output root.
    pub fn relative_target(&self, artifact: &GeneratedArtifact) -> PathBuf {
        let base = match artifact.kind() {
            ArtifactKind::SourceFile { .. } => &self.sources,
            ArtifactKind::ResourceFile { .. } => &self.resources,
            ArtifactKind::DocFile { .. } => &self.docs,
        };
        base.join(artifact.kind().relative_path())
    }

    pub fn target(&self, artifact: &GeneratedArtifact) -> PathBuf {
        self.root.join(self.relative_target(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_file_path_follows_the_qualified_name() {
        let artifact = GeneratedArtifact::source_file("com.acme.InMemoryCustomerRepository", "java")
            .text("class X {}")
            .build()
            .unwrap();
        let layout = OutputLayout::new("out");

        assert_eq!(
            layout.relative_target(&artifact),
            Path::new("sources/com/acme/InMemoryCustomerRepository.java")
        );
        assert_eq!(
            layout.target(&artifact),
            Path::new("out/sources/com/acme/InMemoryCustomerRepository.java")
        );
    }

    #[test]
    fn resource_and_doc_paths_use_their_roots() {
        let layout = OutputLayout::new("out").with_docs("site");
        let doc = GeneratedArtifact::doc_file("architecture/living-doc.md")
            .text("# Domain\n")
            .build()
            .unwrap();
        let resource = GeneratedArtifact::resource_file("archc/ir.json").text("{}").build().unwrap();

        assert_eq!(layout.relative_target(&doc), Path::new("site/architecture/living-doc.md"));
        assert_eq!(layout.relative_target(&resource), Path::new("resources/archc/ir.json"));
    }

    #[test]
    fn paths_must_stay_below_the_root() {
        assert!(ArtifactPath::try_new("/etc/passwd").is_err());
        assert!(ArtifactPath::try_new("docs/../../x.md").is_err());
        assert!(ArtifactPath::try_new("docs//x.md").is_err());
        assert_eq!(ArtifactPath::try_new("docs\\x.md").unwrap().as_str(), "docs/x.md");
    }

    #[test]
    fn builder_checks_required_data() {
        assert_eq!(
            GeneratedArtifact::doc_file("a.md").build(),
            Err(DomainError::MissingRequiredField { field: "artifact.content" })
        );
        assert!(matches!(
            GeneratedArtifact::source_file("", "java").text("").build(),
            Err(DomainError::MissingRequiredField { .. })
        ));
        assert!(
            GeneratedArtifact::resource_file("logo.png")
                .bytes(vec![0u8, 1, 2])
                .merge_mode(MergeMode::MergeCustomBlocks)
                .build()
                .is_err()
        );
        assert!(
            GeneratedArtifact::doc_file("a.md")
                .text("")
                .custom_block("notes")
                .custom_block("notes")
                .build()
                .is_err()
        );
    }

    #[test]
    fn header_uses_the_comment_syntax_of_the_format() {
        let header = ArtifactHeader::new("living-doc").with_notice("Edit only inside custom blocks.");
        let doc = GeneratedArtifact::doc_file("a.md")
            .text("# Domain\n")
            .header(header.clone())
            .build()
            .unwrap();
        let json = GeneratedArtifact::resource_file("a.json")
            .text("{}")
            .header(header)
            .build()
            .unwrap();

        assert_eq!(
            String::from_utf8(doc.rendered()).unwrap(),
            "<!-- Generated by archc (living-doc) -->\n<!-- Edit only inside custom blocks. -->\n# Domain\n"
        );
        assert_eq!(json.rendered(), b"{}".to_vec());
    }
}
