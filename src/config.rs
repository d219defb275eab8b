use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::host::Host;
use crate::platform::Runtime;

/// Token replaced by [`Config::version`] in directory and URL templates.
pub const VERSION_TOKEN: &str = "{#version#}";
/// Token replaced by the runtime display name in the install directory template.
pub const PLATFORM_TOKEN: &str = "{#platform#}";
/// Token replaced by the resolved package file name in the download URL template.
pub const FILE_NAME_TOKEN: &str = "{#fileName#}";

/// Settings for a service package, as written by the hosting application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Runtime identifier string -> package file name.
    #[serde(default)]
    pub download_file_names: HashMap<String, String>,
    pub version: String,
    /// May contain `{#version#}` and `{#platform#}`.
    pub install_directory: String,
    /// May contain `{#version#}` and `{#fileName#}`.
    pub download_url: String,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(rename = "strictSSL", default = "default_strict_ssl")]
    pub strict_ssl: bool,
    #[serde(default)]
    pub executable_files: Vec<String>,
    #[serde(default)]
    pub retry: Option<RetryOptions>,
}

fn default_strict_ssl() -> bool {
    true
}

impl Config {
    /// Loads a JSON configuration file.
    #[tracing::instrument(skip(host))]
    pub fn load<H: Host>(host: &H, path: &Path) -> Result<Self> {
        let content = host.read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// File name configured for exactly this runtime, ignoring empty entries.
    pub fn file_name_for(&self, runtime: Runtime) -> Option<&str> {
        self.download_file_names
            .get(runtime.as_str())
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn retry_options(&self) -> RetryOptions {
        self.retry.clone().unwrap_or_default()
    }

    /// Proxy URL, treating an empty string as no proxy.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref().filter(|p| !p.trim().is_empty())
    }
}

/// Backoff policy for the download-and-extract sequence.
///
/// The default performs a single attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryOptions {
    /// Additional attempts after the first failure.
    pub retries: u32,
    pub factor: f64,
    /// Milliseconds.
    pub min_timeout: u64,
    /// Milliseconds; `None` means unbounded.
    pub max_timeout: Option<u64>,
    pub randomize: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: 0,
            factor: 2.0,
            min_timeout: 1000,
            max_timeout: None,
            randomize: false,
        }
    }
}

impl RetryOptions {
    pub fn with_retries(retries: u32) -> Self {
        Self {
            retries,
            ..Self::default()
        }
    }

    /// Delay before the retry following failed attempt `attempt_index`
    /// (0 for the first failure), given a randomization multiplier in [1, 2).
    pub fn backoff(&self, attempt_index: u32, multiplier: f64) -> Duration {
        let multiplier = if self.randomize { multiplier } else { 1.0 };
        let raw = multiplier * self.min_timeout as f64 * self.factor.powi(attempt_index as i32);
        let capped = match self.max_timeout {
            Some(max) => raw.min(max as f64),
            None => raw,
        };
        if capped.is_finite() && capped > 0.0 {
            Duration::from_millis(capped.round() as u64)
        } else if capped > 0.0 {
            Duration::from_millis(u64::MAX)
        } else {
            Duration::ZERO
        }
    }
}
