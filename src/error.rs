//! Error type shared by every component of the crate.

use std::io;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`], used by callers that only need to
/// branch on the family of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    PlatformNotSupported,
    ArchitectureNotSupported,
    DistributionNotSupported,
    UnknownRuntime,
    TransferStatus,
    Transport,
    Filesystem,
    Extract,
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("The platform '{platform}' is not supported.")]
    PlatformNotSupported { platform: String },

    #[error("The architecture '{architecture}' for platform '{platform}' is not supported.")]
    ArchitectureNotSupported {
        platform: String,
        architecture: String,
    },

    #[error(
        "The distribution '{distribution}' with version '{version}' for platform '{platform}' is not supported."
    )]
    DistributionNotSupported {
        platform: String,
        distribution: String,
        version: String,
    },

    #[error("The runtime 'Unknown' has no fallback or display name")]
    UnknownRuntime,

    #[error("Download of {url} failed with HTTP status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("Request error: {name}")]
    Request { name: String },

    #[error("Response error: {name}")]
    Response { name: String },

    #[error("HTTP status {status} redirect without a Location header")]
    MissingLocation { status: u16 },

    #[error("Gave up after {hops} redirects")]
    TooManyRedirects { hops: usize },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to extract {archive}: {reason}")]
    Extract { archive: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PlatformNotSupported { .. } => ErrorKind::PlatformNotSupported,
            Error::ArchitectureNotSupported { .. } => ErrorKind::ArchitectureNotSupported,
            Error::DistributionNotSupported { .. } => ErrorKind::DistributionNotSupported,
            Error::UnknownRuntime => ErrorKind::UnknownRuntime,
            Error::HttpStatus { .. } | Error::MissingLocation { .. } | Error::TooManyRedirects { .. } => {
                ErrorKind::TransferStatus
            }
            Error::Request { .. } | Error::Response { .. } => ErrorKind::Transport,
            Error::Filesystem { .. } => ErrorKind::Filesystem,
            Error::Extract { .. } => ErrorKind::Extract,
            Error::InvalidUrl { .. } | Error::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status code carried by a transfer error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } | Error::MissingLocation { status } => Some(*status),
            _ => None,
        }
    }

    /// Errors that repeating the operation cannot fix: an authorization
    /// refusal (HTTP 403) or a malformed URL. Everything else is left to the
    /// retry budget.
    pub fn is_bail(&self) -> bool {
        matches!(
            self,
            Error::HttpStatus { status: 403, .. } | Error::InvalidUrl { .. }
        )
    }

    pub(crate) fn fs(context: impl Into<String>, source: io::Error) -> Self {
        Error::Filesystem {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn extract(archive: &std::path::Path, reason: impl ToString) -> Self {
        Error::Extract {
            archive: archive.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
