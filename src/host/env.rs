//! Environment and system information.

use std::env;
use std::path::PathBuf;

use super::RealHost;

impl RealHost {
    #[tracing::instrument(skip(self))]
    pub(crate) fn env_var_impl(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }

    pub(crate) fn os_impl(&self) -> String {
        env::consts::OS.to_string()
    }

    pub(crate) fn arch_impl(&self) -> String {
        #[cfg(target_os = "windows")]
        {
            // A 32-bit process on 64-bit Windows still reports the native
            // machine through PROCESSOR_ARCHITEW6432.
            if let Ok(native) = env::var("PROCESSOR_ARCHITEW6432") {
                return normalize_arch(&native);
            }
        }
        normalize_arch(env::consts::ARCH)
    }

    #[tracing::instrument(skip(self))]
    pub(crate) fn config_dir_impl(&self) -> Option<PathBuf> {
        dirs::config_dir()
    }
}

/// Maps the many spellings of a CPU architecture onto the names used by
/// runtime resolution. Unrecognized names pass through lower-cased.
pub fn normalize_arch(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" => "x86_64".to_string(),
        "x86" | "i386" | "i686" => "x86".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        other => other.to_string(),
    }
}
