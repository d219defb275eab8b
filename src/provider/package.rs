use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

use crate::archive::archive_suffix;
use crate::error::{Error, Result};

/// One download attempt: where the package comes from, where it is
/// unpacked, and the temporary file holding it in between.
#[derive(Debug)]
pub struct Package {
    pub url: String,
    pub install_path: PathBuf,
    file: NamedTempFile,
}

impl Package {
    /// Creates the backing temporary file (`package-*` with the archive's
    /// extension) before any network I/O happens.
    pub fn create(
        url: &str,
        install_path: &Path,
        file_name: &str,
        temp_dir: Option<&Path>,
    ) -> Result<Self> {
        let mut builder = Builder::new();
        builder.prefix("package-").suffix(archive_suffix(file_name));
        let file = match temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| Error::fs("Failed to create temp file", e))?;

        Ok(Self {
            url: url.to_string(),
            install_path: install_path.to_path_buf(),
            file,
        })
    }

    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_mut(&mut self) -> &mut NamedTempFile {
        &mut self.file
    }

    /// Closes and deletes the temporary file. Dropping the package deletes
    /// it too, but without reporting failures.
    pub fn close(self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| Error::fs(format!("Failed to delete {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_temp_file_keeps_archive_extension() {
        let dir = tempdir().unwrap();
        let package = Package::create(
            "https://example.com/service-linux.tar.gz",
            Path::new("/opt/service"),
            "service-linux.tar.gz",
            Some(dir.path()),
        )
        .unwrap();

        let name = package.temp_path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("package-"));
        assert!(name.ends_with(".tar.gz"));
        assert!(package.temp_path().starts_with(dir.path()));
        assert_eq!(package.install_path, PathBuf::from("/opt/service"));
    }

    #[test]
    fn test_close_deletes_file() {
        let dir = tempdir().unwrap();
        let mut package = Package::create("u", dir.path(), "service.zip", Some(dir.path())).unwrap();
        package.file_mut().write_all(b"data").unwrap();
        let path = package.temp_path().to_path_buf();
        assert!(path.exists());

        package.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let err = Package::create("u", dir.path(), "service.zip", Some(&dir.path().join("nope")))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Filesystem);
    }
}
