//! JSON source-model host.
//!
//! A model is a JSON file or a directory of JSON files. Each file becomes
//! one round, in path order; a final empty round closes the compilation.
//!
//! # File format
//!
//! Either a bare array of elements or a document with an `elements` key:
//!
//! ```json
//! {
//!   "elements": [
//!     {
//!       "kind": "class",
//!       "qualified_name": "com.acme.Order",
//!       "annotations": [{ "qualified_name": "org.jmolecules.ddd.annotation.AggregateRoot" }],
//!       "fields": [
//!         { "name": "id", "type": "com.acme.OrderId", "is_final": true },
//!         { "name": "lines", "type": "java.util.List<com.acme.OrderLine>" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Types are written in canonical form (`int`, `byte[]`, `? extends Foo`,
//! `java.util.Optional<com.acme.Customer>`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use archc_core::{
    application::{ApplicationError, ports::SourceHost},
    domain::{Round, SourceElement},
    error::ArchResult,
};

/// Deserialised content of one model file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ModelDocument {
    Elements(Vec<SourceElement>),
    Document { elements: Vec<SourceElement> },
}

impl ModelDocument {
    pub fn into_elements(self) -> Vec<SourceElement> {
        match self {
            Self::Elements(elements) | Self::Document { elements } => elements,
        }
    }
}

/// Reads model files lazily, one per round.
#[derive(Debug)]
pub struct JsonModelHost {
    files: Vec<PathBuf>,
    next: usize,
    closed: bool,
}

impl JsonModelHost {
    /// Collect the model files under `path`.
    ///
    /// # Errors
    ///
    /// `ModelNotFound` when `path` does not exist, or is a directory without
    /// any `.json` file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> ArchResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ApplicationError::ModelNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let files = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            let mut files = Vec::new();
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(|e| ApplicationError::filesystem(path, e))?;
                let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
                if entry.file_type().is_file() && is_json {
                    files.push(entry.into_path());
                }
            }
            files
        };

        if files.is_empty() {
            return Err(ApplicationError::ModelNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        debug!(files = files.len(), "model files collected");

        Ok(Self {
            files,
            next: 0,
            closed: false,
        })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Every element of every file, in round order.
    pub fn read_all(path: impl AsRef<Path>) -> ArchResult<Vec<SourceElement>> {
        let mut host = Self::open(path)?;
        let mut elements = Vec::new();
        while let Some(round) = host.next_round()? {
            elements.extend(round.elements);
        }
        Ok(elements)
    }

    fn read(path: &Path) -> ArchResult<Vec<SourceElement>> {
        let raw = fs::read_to_string(path).map_err(|e| ApplicationError::filesystem(path, e))?;
        let document: ModelDocument =
            serde_json::from_str(&raw).map_err(|e| ApplicationError::InvalidModel {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(document.into_elements())
    }
}

impl SourceHost for JsonModelHost {
    fn next_round(&mut self) -> ArchResult<Option<Round>> {
        if self.closed {
            return Ok(None);
        }
        let number = self.next as u32 + 1;

        match self.files.get(self.next) {
            Some(file) => {
                let elements = Self::read(file)?;
                debug!(round = number, file = %file.display(), elements = elements.len(), "round read");
                self.next += 1;
                Ok(Some(Round::new(number, elements)))
            }
            None => {
                self.closed = true;
                Ok(Some(Round::last(number, Vec::new())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archc_core::{domain::ElementKind, error::ArchError};

    const ORDER: &str = r#"{"elements":[{"kind":"class","qualified_name":"com.acme.Order",
        "fields":[{"name":"id","type":"com.acme.OrderId"}]}]}"#;
    const REPOSITORY: &str = r#"[{"kind":"interface","qualified_name":"com.acme.OrderRepository"}]"#;

    #[test]
    fn directory_files_become_rounds_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), REPOSITORY).unwrap();
        fs::write(dir.path().join("a.json"), ORDER).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut host = JsonModelHost::open(dir.path()).unwrap();
        let first = host.next_round().unwrap().unwrap();
        let second = host.next_round().unwrap().unwrap();
        let last = host.next_round().unwrap().unwrap();

        assert_eq!(first.elements[0].qualified_name, "com.acme.Order");
        assert_eq!(second.elements[0].kind, ElementKind::Interface);
        assert!(last.processing_over && last.elements.is_empty());
        assert_eq!(last.number, 3);
        assert!(host.next_round().unwrap().is_none());
    }

    #[test]
    fn missing_model_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let error = JsonModelHost::open(dir.path().join("absent.json")).unwrap_err();

        assert!(matches!(
            error,
            ArchError::Application(ApplicationError::ModelNotFound { .. })
        ));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("model.json");
        fs::write(&file, r#"[{"kind":"struct","qualified_name":"x"}]"#).unwrap();

        let error = JsonModelHost::read_all(&file).unwrap_err();
        assert!(error.to_string().contains("model.json"));
    }
}
