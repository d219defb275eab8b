use log::debug;
use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::events::SharedObserver;

pub(super) fn extract_zip(
    file: File,
    archive_path: &Path,
    target: &Path,
    observer: &SharedObserver,
) -> Result<u64> {
    let mut archive = ZipArchive::new(file).map_err(|e| Error::extract(archive_path, e))?;
    let total = archive.len() as i64;
    let mut count = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::extract(archive_path, e))?;

        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_path_buf(),
            None => {
                debug!("Skipping entry with invalid path: {}", entry.name());
                continue;
            }
        };
        let full_path = target.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&full_path)
                .map_err(|e| Error::fs(format!("Failed to create {}", full_path.display()), e))?;
        } else {
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::fs(format!("Failed to create {}", parent.display()), e))?;
            }
            let mut dest = File::create(&full_path)
                .map_err(|e| Error::fs(format!("Failed to create {}", full_path.display()), e))?;
            std::io::copy(&mut entry, &mut dest)
                .map_err(|e| Error::fs(format!("Failed to extract {}", full_path.display()), e))?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(&full_path, fs::Permissions::from_mode(mode)) {
                    debug!("Failed to set permissions on {:?}: {}", full_path, e);
                }
            }
        }

        count += 1;
        observer.entry_extracted(&entry_path, count, total);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingObserver;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::tempdir;
    use zip::CompressionMethod;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    #[test]
    #[cfg(unix)]
    fn test_extract_preserves_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("service.zip");
        {
            let file = File::create(&archive_path).unwrap();
            let mut zip = ZipWriter::new(file);

            let options: FileOptions<()> = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o755);
            zip.start_file("bin/service", options).unwrap();
            zip.write_all(b"#!/bin/sh\necho hello").unwrap();

            let options: FileOptions<()> = FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644);
            zip.start_file("bin/service.json", options).unwrap();
            zip.write_all(b"{}").unwrap();

            zip.finish().unwrap();
        }

        let target = dir.path().join("out");
        let observer: SharedObserver = Arc::new(RecordingObserver::default());
        let count = extract_zip(
            File::open(&archive_path).unwrap(),
            &archive_path,
            &target,
            &observer,
        )
        .unwrap();
        assert_eq!(count, 2);

        let mode = fs::metadata(target.join("bin/service")).unwrap().permissions().mode();
        assert!(mode & 0o111 != 0, "expected executable, mode was {:o}", mode);

        let mode = fs::metadata(target.join("bin/service.json"))
            .unwrap()
            .permissions()
            .mode();
        assert!(mode & 0o111 == 0, "expected non-executable, mode was {:o}", mode);
    }

    #[test]
    fn test_extract_skips_entries_escaping_target() {
        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("evil.zip");
        {
            let file = File::create(&archive_path).unwrap();
            let mut zip = ZipWriter::new(file);
            let options: FileOptions<()> = FileOptions::default();
            zip.start_file("../escaped.txt", options).unwrap();
            zip.write_all(b"nope").unwrap();
            zip.start_file("inside.txt", options).unwrap();
            zip.write_all(b"yes").unwrap();
            zip.finish().unwrap();
        }

        let target = dir.path().join("out");
        let observer: SharedObserver = Arc::new(RecordingObserver::default());
        let count = extract_zip(
            File::open(&archive_path).unwrap(),
            &archive_path,
            &target,
            &observer,
        )
        .unwrap();

        assert_eq!(count, 1);
        assert!(target.join("inside.txt").exists());
        assert!(!dir.path().join("escaped.txt").exists());
    }
}
