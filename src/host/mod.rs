//! Host abstraction for system queries and file operations.
//!
//! Everything that touches the machine goes through the [`Host`] trait so
//! detection and install logic can be exercised against a mock.
//!
//! # Structure
//!
//! - `env` - Environment variables, OS and CPU architecture
//! - `fs` - File system operations

mod env;
mod fs;

use crate::error::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

pub use env::normalize_arch;

#[cfg_attr(test, mockall::automock)]
pub trait Host: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    /// Operating system name as reported by `std::env::consts::OS`.
    fn os(&self) -> String;

    /// Normalized CPU architecture: `x86`, `x86_64`, `arm64`, or the raw name.
    fn arch(&self) -> String;

    fn config_dir(&self) -> Option<PathBuf>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealHost;

impl Host for RealHost {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn os(&self) -> String {
        self.os_impl()
    }

    fn arch(&self) -> String {
        self.arch_impl()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }
}
