pub mod archive;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod http;
pub mod logger;
pub mod platform;
pub mod provider;

pub use error::{Error, ErrorKind, Result};

/// Recording collaborators and archive fixtures shared by unit tests.
#[cfg(test)]
pub mod test_utils {
    use crate::events::ProgressObserver;
    use crate::logger::{LogLevel, Logger};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// Logger that keeps every message for later assertions.
    #[derive(Default)]
    pub struct RecordingLogger {
        entries: Mutex<Vec<(LogLevel, String)>>,
    }

    impl RecordingLogger {
        pub fn entries(&self) -> Vec<(LogLevel, String)> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl Logger for RecordingLogger {
        fn log(&self, level: LogLevel, message: &str) {
            self.entries.lock().unwrap().push((level, message.to_string()));
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Recorded {
        DownloadStarted(String, Option<u64>),
        DownloadProgress(u8),
        DownloadEnded,
        InstallStarted(PathBuf),
        InstallEnded,
        EntryExtracted(PathBuf, u64, i64),
    }

    /// Observer that keeps every event in arrival order.
    #[derive(Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<Recorded>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<Recorded> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, event: Recorded) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl ProgressObserver for RecordingObserver {
        fn download_started(&self, url: &str, total_size: Option<u64>) {
            self.push(Recorded::DownloadStarted(url.to_string(), total_size));
        }

        fn download_progress(&self, percentage: u8) {
            self.push(Recorded::DownloadProgress(percentage));
        }

        fn download_ended(&self) {
            self.push(Recorded::DownloadEnded);
        }

        fn install_started(&self, target: &Path) {
            self.push(Recorded::InstallStarted(target.to_path_buf()));
        }

        fn install_ended(&self) {
            self.push(Recorded::InstallEnded);
        }

        fn entry_extracted(&self, path: &Path, index: u64, total: i64) {
            self.push(Recorded::EntryExtracted(path.to_path_buf(), index, total));
        }
    }

    const ROOT_TXT: &str = "root document\n";
    const FOLDER_DOC_TXT: &str = "folder document\n";

    /// Tar with `ExtractionTest/Root.txt` and `ExtractionTest/Folder/FolderDoc.txt`
    /// plus their directory entries (four entries in all).
    pub fn extraction_test_tar() -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for dir in ["ExtractionTest/", "ExtractionTest/Folder/"] {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            header.set_path(dir).unwrap();
            header.set_cksum();
            builder.append(&header, std::io::empty()).unwrap();
        }
        for (name, content) in [
            ("ExtractionTest/Root.txt", ROOT_TXT),
            ("ExtractionTest/Folder/FolderDoc.txt", FOLDER_DOC_TXT),
        ] {
            append_file(&mut builder, name, content, 0o644);
        }
        builder.into_inner().unwrap()
    }

    pub fn extraction_test_tar_gz() -> Vec<u8> {
        gzip(&extraction_test_tar())
    }

    pub fn extraction_test_zip() -> Vec<u8> {
        use zip::write::FileOptions;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> = FileOptions::default();
        zip.add_directory("ExtractionTest/", options).unwrap();
        zip.start_file("ExtractionTest/Root.txt", options).unwrap();
        zip.write_all(ROOT_TXT.as_bytes()).unwrap();
        zip.add_directory("ExtractionTest/Folder/", options).unwrap();
        zip.start_file("ExtractionTest/Folder/FolderDoc.txt", options).unwrap();
        zip.write_all(FOLDER_DOC_TXT.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    /// Gzip-compressed tar of regular files, all executable.
    pub fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (name, content) in files {
            append_file(&mut builder, name, content, 0o755);
        }
        gzip(&builder.into_inner().unwrap())
    }

    fn append_file(builder: &mut tar::Builder<Vec<u8>>, name: &str, content: &str, mode: u32) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(mode);
        header.set_path(name).unwrap();
        header.set_cksum();
        builder.append(&header, content.as_bytes()).unwrap();
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }
}
