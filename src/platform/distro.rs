use std::fmt;
use std::path::Path;

use crate::host::Host;

const UNKNOWN: &str = "unknown";

/// Primary and secondary os-release locations, tried in order.
const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// Linux distribution as described by the os-release file.
///
/// See <https://www.freedesktop.org/software/systemd/man/os-release.html>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxDistribution {
    pub name: String,
    pub version: String,
    /// Families this distribution claims compatibility with, in the order
    /// they are listed by `ID_LIKE`.
    pub id_like: Vec<String>,
}

impl LinuxDistribution {
    pub fn new(name: impl Into<String>, version: impl Into<String>, id_like: Vec<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            id_like,
        }
    }

    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, Vec::new())
    }

    /// Reads the distribution of the running system. Falls back to
    /// [`LinuxDistribution::unknown`] when no os-release file is readable.
    #[tracing::instrument(skip(host))]
    pub fn current<H: Host + ?Sized>(host: &H) -> Self {
        OS_RELEASE_PATHS
            .iter()
            .find_map(|path| host.read_to_string(Path::new(path)).ok())
            .map(|content| Self::from_release_info(&content))
            .unwrap_or_else(Self::unknown)
    }

    pub fn from_release_info(release_info: &str) -> Self {
        let mut name = None;
        let mut version = None;
        let mut id_like = None;

        for line in release_info.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = strip_quotes(value);

            match key {
                "ID" => name = Some(value.to_string()),
                "VERSION_ID" => version = Some(value.to_string()),
                "ID_LIKE" => {
                    id_like = Some(value.split_whitespace().map(str::to_string).collect())
                }
                _ => {}
            }

            if name.is_some() && version.is_some() && id_like.is_some() {
                break;
            }
        }

        Self {
            name: name.unwrap_or_else(|| UNKNOWN.to_string()),
            version: version.unwrap_or_else(|| UNKNOWN.to_string()),
            id_like: id_like.unwrap_or_default(),
        }
    }
}

fn strip_quotes(value: &str) -> &str {
    if value.len() > 1
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

impl fmt::Display for LinuxDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name={}, version={}", self.name, self.version)
    }
}
