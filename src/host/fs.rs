//! File system operations.

use std::fs;
use std::path::Path;

use super::RealHost;
use crate::error::{Error, Result};

impl RealHost {
    #[tracing::instrument(skip(self))]
    pub(crate) fn read_to_string_impl(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| Error::fs(format!("Failed to read {}", path.display()), e))
    }

    pub(crate) fn exists_impl(&self, path: &Path) -> bool {
        path.exists()
    }

    pub(crate) fn is_file_impl(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn create_dir_all_impl(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .map_err(|e| Error::fs(format!("Failed to create directory {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::host::{Host, RealHost};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_real_host_file_ops() {
        let host = RealHost;
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("os-release");
        fs::write(&file_path, "ID=ubuntu\n").unwrap();

        assert!(host.exists(&file_path));
        assert!(host.is_file(&file_path));
        assert_eq!(host.read_to_string(&file_path).unwrap(), "ID=ubuntu\n");
        assert!(!host.is_file(dir.path()));
        assert!(!host.exists(&dir.path().join("missing")));
    }

    #[test]
    fn test_real_host_create_dir_all() {
        let host = RealHost;
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b/c");

        host.create_dir_all(&nested).unwrap();
        assert!(host.exists(&nested));
        assert!(!host.is_file(&nested));

        // Creating an existing directory is not an error
        host.create_dir_all(&nested).unwrap();
    }

    #[test]
    fn test_real_host_errors() {
        let host = RealHost;

        let err = host
            .read_to_string(std::path::Path::new("/nonexistent/path/file.txt"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().contains("Failed to read"));
    }
}
