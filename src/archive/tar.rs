use log::debug;
use std::io::Read;
use std::path::Path;
use tar::Archive;

use crate::error::{Error, Result};
use crate::events::{SharedObserver, UNKNOWN_ENTRY_COUNT};

/// Streams a tar archive into `target`, one entry at a time.
///
/// Tar has no index, so every notification carries [`UNKNOWN_ENTRY_COUNT`]
/// as the total.
pub(super) fn extract_tar<R: Read>(
    reader: R,
    archive_path: &Path,
    target: &Path,
    observer: &SharedObserver,
) -> Result<u64> {
    let mut archive = Archive::new(reader);
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| Error::extract(archive_path, e))?;

    let mut count = 0;
    for entry in entries {
        let mut entry = entry.map_err(|e| Error::extract(archive_path, e))?;
        let entry_path = entry
            .path()
            .map_err(|e| Error::extract(archive_path, e))?
            .into_owned();

        // unpack_in refuses entries that would land outside `target`
        let unpacked = entry
            .unpack_in(target)
            .map_err(|e| Error::extract(archive_path, format!("{}: {}", entry_path.display(), e)))?;
        if !unpacked {
            debug!("Skipping entry with invalid path: {}", entry_path.display());
            continue;
        }

        count += 1;
        observer.entry_extracted(&entry_path, count, UNKNOWN_ENTRY_COUNT);
    }

    Ok(count)
}
