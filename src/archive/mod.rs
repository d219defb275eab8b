mod tar;
mod zip;

use log::debug;
use std::fs::{self, File};
use std::path::Path;

use crate::error::{Error, Result};
use crate::events::SharedObserver;
use crate::logger::SharedLogger;

/// Archive family, chosen purely from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Tar,
    /// Gzip-compressed tar, including a bare `.gz`.
    TarGz,
    /// Anything that is not tar-family.
    Zip,
}

impl ArchiveFormat {
    pub fn detect(archive_path: &Path) -> Self {
        let name = archive_path.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") || name.ends_with(".gz") {
            ArchiveFormat::TarGz
        } else if name.ends_with(".tar") {
            ArchiveFormat::Tar
        } else {
            ArchiveFormat::Zip
        }
    }
}

/// File-name suffix to keep on a temporary copy of `file_name` so that
/// [`ArchiveFormat::detect`] still recognizes it.
pub fn archive_suffix(file_name: &str) -> &'static str {
    let name = file_name.to_lowercase();
    if name.ends_with(".tar.gz") {
        ".tar.gz"
    } else if name.ends_with(".tgz") {
        ".tgz"
    } else if name.ends_with(".gz") {
        ".gz"
    } else if name.ends_with(".tar") {
        ".tar"
    } else if name.ends_with(".zip") {
        ".zip"
    } else {
        ""
    }
}

/// Unpacks service packages into an install directory.
#[derive(Clone)]
pub struct ArchiveExtractor {
    logger: SharedLogger,
    observer: SharedObserver,
}

impl ArchiveExtractor {
    pub fn new(logger: SharedLogger, observer: SharedObserver) -> Self {
        Self { logger, observer }
    }

    /// Extracts `archive_path` into `target`, creating `target` if needed.
    /// Returns the number of entries written.
    #[tracing::instrument(skip(self))]
    pub fn extract(&self, archive_path: &Path, target: &Path) -> Result<u64> {
        let format = ArchiveFormat::detect(archive_path);
        self.logger.verbose(&format!(
            "Extracting {} ({:?}) into {}",
            archive_path.display(),
            format,
            target.display()
        ));

        fs::create_dir_all(target).map_err(|e| {
            Error::fs(format!("Failed to create directory {}", target.display()), e)
        })?;
        let file = File::open(archive_path).map_err(|e| {
            Error::fs(format!("Failed to open archive {}", archive_path.display()), e)
        })?;

        let count = match format {
            ArchiveFormat::Tar => tar::extract_tar(file, archive_path, target, &self.observer)?,
            ArchiveFormat::TarGz => tar::extract_tar(
                flate2::read::GzDecoder::new(file),
                archive_path,
                target,
                &self.observer,
            )?,
            ArchiveFormat::Zip => zip::extract_zip(file, archive_path, target, &self.observer)?,
        };

        debug!("Extracted {} entries into {:?}", count, target);
        Ok(count)
    }
}
