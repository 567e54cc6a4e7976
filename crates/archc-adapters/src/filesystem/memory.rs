//! In-memory filesystem adapter for tests and dry runs.

use std::{
    collections::{BTreeMap, HashSet},
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use archc_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{ArchError, ArchResult},
};

/// In-memory filesystem.
///
/// With a base filesystem (see [`MemoryFilesystem::over`]) reads fall
/// through to the base for paths not written in memory, while every write
/// stays in memory. That is what `--dry-run` uses: merges see the files on
/// disk, nothing on disk changes.
#[derive(Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
    base: Option<Arc<dyn Filesystem>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
            base: None,
        }
    }

    /// Memory layer over `base`.
    pub fn over(base: Arc<dyn Filesystem>) -> Self {
        Self {
            base: Some(base),
            ..Self::new()
        }
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> Self {
        if let Ok(mut inner) = self.inner.write() {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                insert_ancestors(&mut inner.directories, parent);
            }
            inner.files.insert(path.to_path_buf(), content.as_ref().to_vec());
        }
        self
    }

    /// A file's content as text, if it was written in memory (testing helper).
    pub fn read_text(&self, path: impl AsRef<Path>) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Files written in memory, sorted by path.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryFilesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFilesystem")
            .field("files", &self.list_files().len())
            .field("layered", &self.base.is_some())
            .finish()
    }
}

fn insert_ancestors(directories: &mut HashSet<PathBuf>, path: &Path) {
    let mut current = PathBuf::new();
    for component in path.components() {
        current.push(component);
        directories.insert(current.clone());
    }
}

fn lock_error() -> ArchError {
    ArchError::internal("memory filesystem lock poisoned")
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> ArchResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;
        insert_ancestors(&mut inner.directories, path);
        Ok(())
    }

    fn read_file(&self, path: &Path) -> ArchResult<Vec<u8>> {
        let inner = self.inner.read().map_err(|_| lock_error())?;
        if let Some(content) = inner.files.get(path) {
            return Ok(content.clone());
        }
        match &self.base {
            Some(base) => base.read_file(path),
            None => Err(ApplicationError::filesystem(path, "No such file").into()),
        }
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> ArchResult<()> {
        let mut inner = self.inner.write().map_err(|_| lock_error())?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let in_memory = self
            .inner
            .read()
            .is_ok_and(|inner| inner.files.contains_key(path) || inner.directories.contains(path));
        in_memory || self.base.as_ref().is_some_and(|base| base.exists(path))
    }
}
