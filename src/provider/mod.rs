//! Service package resolution and installation.
//!
//! [`ServiceDownloadProvider`] turns a [`Runtime`] into a package file name,
//! an install directory and a download URL, and drives the
//! download-then-extract sequence under the configured retry policy.
//! [`ServerProvider`] sits on top and answers "where is the server binary",
//! downloading it first when needed.

mod package;
mod server;

use std::path::{Path, PathBuf};

use crate::archive::ArchiveExtractor;
use crate::config::{Config, FILE_NAME_TOKEN, PLATFORM_TOKEN, VERSION_TOKEN};
use crate::error::{Error, Result};
use crate::events::SharedObserver;
use crate::host::Host;
use crate::http::{DownloadManager, with_retry};
use crate::logger::SharedLogger;
use crate::platform::{LinuxDistribution, Runtime, is_linux_platform};

pub use package::Package;
pub use server::ServerProvider;

pub struct ServiceDownloadProvider<H: Host> {
    config: Config,
    host: H,
    downloader: DownloadManager,
    extractor: ArchiveExtractor,
    logger: SharedLogger,
    observer: SharedObserver,
    temp_dir: Option<PathBuf>,
}

impl<H: Host> ServiceDownloadProvider<H> {
    /// Builds a provider whose HTTP client follows the config's proxy and
    /// TLS settings.
    pub fn new(config: Config, host: H, logger: SharedLogger, observer: SharedObserver) -> Result<Self> {
        let downloader = DownloadManager::new(
            config.proxy(),
            config.strict_ssl,
            logger.clone(),
            observer.clone(),
        )?;
        let extractor = ArchiveExtractor::new(logger.clone(), observer.clone());

        Ok(Self {
            config,
            host,
            downloader,
            extractor,
            logger,
            observer,
            temp_dir: None,
        })
    }

    /// Places temporary package files in `dir` instead of the system temp
    /// directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn logger(&self) -> &SharedLogger {
        &self.logger
    }

    /// Package file name for `runtime`: the first candidate in
    /// `[runtime, ..fallback chain]` with a non-empty configured entry.
    pub fn resolve_filename(&self, runtime: Runtime) -> Result<String> {
        for candidate in runtime.candidates()? {
            if let Some(file_name) = self.config.file_name_for(candidate) {
                if candidate != runtime {
                    self.logger.verbose(&format!(
                        "No package for {}, using the one configured for {}",
                        runtime, candidate
                    ));
                }
                return Ok(file_name.to_string());
            }
        }

        let platform = self.host.os();
        if is_linux_platform(&platform) {
            let distribution = LinuxDistribution::current(&self.host);
            Err(Error::DistributionNotSupported {
                platform,
                distribution: distribution.name,
                version: distribution.version,
            })
        } else {
            Err(Error::PlatformNotSupported { platform })
        }
    }

    /// Install directory for `runtime` with the version and platform tokens
    /// substituted. Nothing is created.
    pub fn install_directory(&self, runtime: Runtime) -> Result<PathBuf> {
        let directory = self
            .config
            .install_directory
            .replace(VERSION_TOKEN, &self.config.version)
            .replace(PLATFORM_TOKEN, runtime.display_name()?);
        Ok(PathBuf::from(directory))
    }

    /// [`Self::install_directory`], creating it and any missing parents.
    pub fn resolve_install_directory(&self, runtime: Runtime) -> Result<PathBuf> {
        let directory = self.install_directory(runtime)?;
        if !self.host.exists(&directory) {
            self.logger
                .verbose(&format!("Creating install directory {}", directory.display()));
            self.host.create_dir_all(&directory)?;
        }
        Ok(directory)
    }

    pub fn download_url(&self, file_name: &str) -> String {
        self.config
            .download_url
            .replace(VERSION_TOKEN, &self.config.version)
            .replace(FILE_NAME_TOKEN, file_name)
    }

    /// Downloads and extracts the package for `runtime` into its install
    /// directory. Each attempt gets a fresh temporary file which is removed
    /// before the attempt returns, whatever the outcome.
    ///
    /// Concurrent installs into the same directory are not coordinated.
    #[tracing::instrument(skip(self))]
    pub async fn install_service(&self, runtime: Runtime) -> Result<bool> {
        let file_name = self.resolve_filename(runtime)?;
        let install_directory = self.resolve_install_directory(runtime)?;
        let url = self.download_url(&file_name);

        let options = self.config.retry_options();
        with_retry("install service", &options, self.logger.as_ref(), || {
            self.install_package(&url, &install_directory, &file_name)
        })
        .await?;

        Ok(true)
    }

    async fn install_package(&self, url: &str, install_directory: &Path, file_name: &str) -> Result<()> {
        let mut package = Package::create(url, install_directory, file_name, self.temp_dir.as_deref())?;
        self.logger.info(&format!(
            "Downloading {} to {}",
            package.url,
            package.temp_path().display()
        ));

        let outcome = self.download_and_extract(&mut package).await;

        let temp_path = package.temp_path().to_path_buf();
        match package.close() {
            Ok(()) => self
                .logger
                .verbose(&format!("Deleted package file {}", temp_path.display())),
            Err(e) => self.logger.warn(&e.to_string()),
        }

        outcome
    }

    async fn download_and_extract(&self, package: &mut Package) -> Result<()> {
        let url = package.url.clone();
        self.downloader.download_file(&url, package.file_mut()).await?;

        self.logger.info(&format!(
            "Installing package from {}",
            package.temp_path().display()
        ));
        self.observer.install_started(&package.install_path);

        self.extractor
            .extract(package.temp_path(), &package.install_path)?;

        self.observer.install_ended();
        Ok(())
    }
}
