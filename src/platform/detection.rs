use std::fmt;

use super::{LinuxDistribution, Runtime};
use crate::error::{Error, Result};
use crate::host::{Host, normalize_arch};
use crate::logger::Logger;

/// Environment variable that, when set to a runtime identifier, replaces
/// all platform detection. Useful when preparing a service for another
/// machine than the one running the tool.
pub const RUNTIME_OVERRIDE_ENV: &str = "SVCFETCH_RUNTIME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OsFamily {
    Windows,
    MacOs,
    Linux,
}

fn os_family(platform: &str) -> Option<OsFamily> {
    match platform.to_lowercase().as_str() {
        "windows" | "win32" => Some(OsFamily::Windows),
        "macos" | "darwin" => Some(OsFamily::MacOs),
        "linux" => Some(OsFamily::Linux),
        _ => None,
    }
}

/// Whether `platform` names Linux, accepting the same aliases as detection.
pub fn is_linux_platform(platform: &str) -> bool {
    os_family(platform) == Some(OsFamily::Linux)
}

/// Maps raw host facts to a [`Runtime`].
///
/// An `override_value` is returned as-is before anything else is looked at.
/// On Linux an unrecognized distribution is not an error: its `ID_LIKE`
/// families are tried in order and, failing those, the generic `Linux`
/// runtime is returned with a warning.
pub fn resolve_runtime(
    platform: &str,
    architecture: &str,
    distribution: Option<&LinuxDistribution>,
    override_value: Option<Runtime>,
    logger: &dyn Logger,
) -> Result<Runtime> {
    if let Some(runtime) = override_value {
        return Ok(runtime);
    }

    let arch = normalize_arch(architecture);
    let unsupported_arch = || Error::ArchitectureNotSupported {
        platform: platform.to_string(),
        architecture: architecture.to_string(),
    };

    match os_family(platform) {
        Some(OsFamily::Windows) => match arch.as_str() {
            "x86" => Ok(Runtime::Windows86),
            "x86_64" => Ok(Runtime::Windows64),
            "arm64" => Ok(Runtime::WindowsArm64),
            _ => Err(unsupported_arch()),
        },
        Some(OsFamily::MacOs) => match arch.as_str() {
            "x86_64" => Ok(Runtime::Osx),
            "arm64" => Ok(Runtime::OsxArm64),
            _ => Err(unsupported_arch()),
        },
        Some(OsFamily::Linux) => {
            let unknown = LinuxDistribution::unknown();
            let distribution = distribution.unwrap_or(&unknown);

            if arch != "x86_64" {
                return Err(Error::DistributionNotSupported {
                    platform: platform.to_string(),
                    distribution: distribution.name.clone(),
                    version: distribution.version.clone(),
                });
            }

            // ID_LIKE carries no version of its own, so VERSION_ID is reused
            // for every candidate family.
            let resolved = std::iter::once(&distribution.name)
                .chain(distribution.id_like.iter())
                .find_map(|name| linux_runtime(name, &distribution.version));

            match resolved {
                Some(runtime) => Ok(runtime),
                None => {
                    logger.warn(&format!(
                        "Unrecognized Linux distribution ({}), falling back to the generic {} runtime",
                        distribution,
                        Runtime::Linux
                    ));
                    Ok(Runtime::Linux)
                }
            }
        }
        None => Err(Error::PlatformNotSupported {
            platform: platform.to_string(),
        }),
    }
}

/// Distribution table lookup on a single name. `None` when the name is
/// not one we know.
fn linux_runtime(name: &str, version: &str) -> Option<Runtime> {
    let runtime = match name.to_lowercase().as_str() {
        "ubuntu" => {
            if version.starts_with("14") {
                Runtime::Ubuntu14
            } else if version.starts_with("16") {
                Runtime::Ubuntu16
            } else if version.starts_with("18") {
                Runtime::Ubuntu18
            } else if version.starts_with("20") {
                Runtime::Ubuntu20
            } else if version.starts_with("22") {
                Runtime::Ubuntu22
            } else {
                Runtime::Ubuntu
            }
        }
        "elementary" | "elementary os" => {
            // Freya and Loki are built on Ubuntu 14.04 and 16.04
            if version.starts_with("0.3") {
                Runtime::Ubuntu14
            } else if version.starts_with("0.4") {
                Runtime::Ubuntu16
            } else {
                Runtime::ElementaryOs
            }
        }
        // Binary compatible with the distribution they are built on
        "linuxmint" | "galliumos" => Runtime::Ubuntu16,
        "centos" | "ol" => Runtime::CentOs,
        "fedora" => Runtime::Fedora,
        "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" => Runtime::OpenSuse,
        "sles" => Runtime::Sles,
        "rhel" => Runtime::Rhel,
        "debian" => Runtime::Debian,
        _ => return None,
    };
    Some(runtime)
}

/// Reads [`RUNTIME_OVERRIDE_ENV`]. Values that do not name a concrete
/// runtime are reported and ignored.
pub fn runtime_override<H: Host + ?Sized>(host: &H, logger: &dyn Logger) -> Option<Runtime> {
    let value = host.env_var(RUNTIME_OVERRIDE_ENV).ok()?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<Runtime>() {
        Ok(Runtime::Unknown) | Err(_) => {
            logger.warn(&format!(
                "Ignoring {}={}: not a known runtime identifier",
                RUNTIME_OVERRIDE_ENV, value
            ));
            None
        }
        Ok(runtime) => Some(runtime),
    }
}

/// What the host looks like and which runtime it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInformation {
    pub platform: String,
    pub architecture: String,
    pub distribution: Option<LinuxDistribution>,
    /// `None` when resolution failed; never [`Runtime::Unknown`].
    pub runtime_id: Option<Runtime>,
}

impl PlatformInformation {
    pub fn new(
        platform: impl Into<String>,
        architecture: impl Into<String>,
        distribution: Option<LinuxDistribution>,
        override_value: Option<Runtime>,
        logger: &dyn Logger,
    ) -> Self {
        let platform = platform.into();
        let architecture = architecture.into();
        let runtime_id = resolve_runtime(
            &platform,
            &architecture,
            distribution.as_ref(),
            override_value,
            logger,
        )
        .ok()
        .filter(|r| *r != Runtime::Unknown);

        Self {
            platform,
            architecture,
            distribution,
            runtime_id,
        }
    }

    /// Inspects the running machine.
    #[tracing::instrument(skip(host, logger))]
    pub fn current<H: Host + ?Sized>(host: &H, logger: &dyn Logger) -> Self {
        let platform = host.os();
        let architecture = host.arch();
        let distribution = match os_family(&platform) {
            Some(OsFamily::Linux) => Some(LinuxDistribution::current(host)),
            _ => None,
        };
        let override_value = runtime_override(host, logger);

        Self::new(platform, architecture, distribution, override_value, logger)
    }

    /// The resolved runtime, or the error explaining why there is none.
    pub fn require_runtime(&self, logger: &dyn Logger) -> Result<Runtime> {
        if let Some(runtime) = self.runtime_id {
            return Ok(runtime);
        }
        match resolve_runtime(
            &self.platform,
            &self.architecture,
            self.distribution.as_ref(),
            None,
            logger,
        )? {
            Runtime::Unknown => Err(Error::UnknownRuntime),
            runtime => Ok(runtime),
        }
    }

    pub fn is_windows(&self) -> bool {
        os_family(&self.platform) == Some(OsFamily::Windows)
    }

    pub fn is_macos(&self) -> bool {
        os_family(&self.platform) == Some(OsFamily::MacOs)
    }

    pub fn is_linux(&self) -> bool {
        os_family(&self.platform) == Some(OsFamily::Linux)
    }

    pub fn is_valid_runtime(&self) -> bool {
        self.runtime_id.is_some()
    }

    pub fn runtime_display_name(&self) -> Option<&'static str> {
        self.runtime_id.and_then(|r| r.display_name().ok())
    }
}

impl fmt::Display for PlatformInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.platform)?;
        if !self.architecture.is_empty() {
            write!(f, ", {}", self.architecture)?;
        }
        if let Some(distribution) = &self.distribution {
            write!(f, ", {}", distribution)?;
        }
        Ok(())
    }
}
