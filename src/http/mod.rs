//! HTTP download and retry.

mod client;
mod retry;

pub use client::{DownloadManager, DownloadProgress, MAX_REDIRECTS};
pub use retry::with_retry;
