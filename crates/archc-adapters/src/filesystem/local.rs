//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use archc_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{ArchError, ArchResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> ArchResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn read_file(&self, path: &Path) -> ArchResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> ArchResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> ArchError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_reads_back_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFilesystem::new();
        let nested = dir.path().join("docs/domain");
        let file = nested.join("orders.md");

        fs.create_dir_all(&nested).unwrap();
        fs.write_file(&file, b"# Orders\n").unwrap();

        assert!(fs.exists(&file));
        assert_eq!(fs.read_file(&file).unwrap(), b"# Orders\n");
    }

    #[test]
    fn missing_file_maps_to_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = LocalFilesystem::new()
            .read_file(&dir.path().join("absent.md"))
            .unwrap_err();

        assert!(matches!(
            error,
            ArchError::Application(ApplicationError::FilesystemError { .. })
        ));
    }
}
