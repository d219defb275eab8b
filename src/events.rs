//! Typed progress and lifecycle notifications.
//!
//! Every event kind has its own method so observers only implement what
//! they care about. All methods default to doing nothing.

use std::path::Path;
use std::sync::Arc;

/// Reported as the total entry count when the archive format cannot tell
/// how many entries it holds up front (tar).
pub const UNKNOWN_ENTRY_COUNT: i64 = -1;

pub trait ProgressObserver: Send + Sync {
    /// A download began. `total_size` is `None` without a Content-Length.
    fn download_started(&self, _url: &str, _total_size: Option<u64>) {}

    /// Integer percentage, only fired when the value changes.
    fn download_progress(&self, _percentage: u8) {}

    fn download_ended(&self) {}

    fn install_started(&self, _target: &Path) {}

    fn install_ended(&self) {}

    /// `index` counts from 1. `total` is [`UNKNOWN_ENTRY_COUNT`] for tar archives.
    fn entry_extracted(&self, _path: &Path, _index: u64, _total: i64) {}
}

pub type SharedObserver = Arc<dyn ProgressObserver>;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl NoopObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(NoopObserver)
    }
}

impl ProgressObserver for NoopObserver {}
