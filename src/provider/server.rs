use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::ServiceDownloadProvider;
use crate::error::Result;
use crate::host::Host;
use crate::platform::{PlatformInformation, Runtime};

/// Finds the service executable, downloading the package first when it is
/// not installed yet.
pub struct ServerProvider<H: Host> {
    provider: ServiceDownloadProvider<H>,
    runtime: OnceLock<Runtime>,
}

impl<H: Host> ServerProvider<H> {
    pub fn new(provider: ServiceDownloadProvider<H>) -> Self {
        Self {
            provider,
            runtime: OnceLock::new(),
        }
    }

    /// Skips platform detection and always uses `runtime`.
    pub fn with_runtime(provider: ServiceDownloadProvider<H>, runtime: Runtime) -> Self {
        let server = Self::new(provider);
        let _ = server.runtime.set(runtime);
        server
    }

    pub fn download_provider(&self) -> &ServiceDownloadProvider<H> {
        &self.provider
    }

    /// Runtime of this machine, detected on first use and then cached for
    /// the lifetime of this provider.
    pub fn runtime(&self) -> Result<Runtime> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(*runtime);
        }

        let logger = self.provider.logger().as_ref();
        let info = PlatformInformation::current(self.provider.host(), logger);
        logger.verbose(&format!("Platform: {}", info));
        let runtime = info.require_runtime(logger)?;
        Ok(*self.runtime.get_or_init(|| runtime))
    }

    /// `path` itself when it is a file. Otherwise the first of
    /// `executable_files` (the configured names by default) that exists
    /// inside `path`.
    pub fn find_server_path(&self, path: &Path, executable_files: Option<&[String]>) -> Option<PathBuf> {
        let host = self.provider.host();
        if host.is_file(path) {
            return Some(path.to_path_buf());
        }

        let executable_files =
            executable_files.unwrap_or(self.provider.config().executable_files.as_slice());
        executable_files
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| host.exists(candidate))
    }

    /// Executable inside the install directory, if it has been installed.
    pub fn server_path(&self) -> Result<Option<PathBuf>> {
        let runtime = self.runtime()?;
        let install_directory = self.provider.resolve_install_directory(runtime)?;
        Ok(self.find_server_path(&install_directory, None))
    }

    /// Installs the package and returns the executable it provides.
    #[tracing::instrument(skip(self))]
    pub async fn download_server_files(&self) -> Result<Option<PathBuf>> {
        let runtime = self.runtime()?;
        let install_directory = self.provider.resolve_install_directory(runtime)?;
        self.provider.install_service(runtime).await?;
        Ok(self.find_server_path(&install_directory, None))
    }

    pub async fn get_or_download_server(&self) -> Result<Option<PathBuf>> {
        match self.server_path()? {
            Some(path) => Ok(Some(path)),
            None => self.download_server_files().await,
        }
    }
}
