use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Canonical runtime identifier: operating system, CPU architecture and,
/// on Linux, a distribution or distribution release.
///
/// The wire string of each variant (see [`Runtime::as_str`]) is the key
/// used in `downloadFileNames`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runtime {
    Unknown,
    Windows,
    #[serde(rename = "Windows_86")]
    Windows86,
    #[serde(rename = "Windows_64")]
    Windows64,
    #[serde(rename = "Windows_ARM64")]
    WindowsArm64,
    #[serde(rename = "OSX")]
    Osx,
    #[serde(rename = "OSX_ARM64")]
    OsxArm64,
    Linux,
    #[serde(rename = "CentOS")]
    CentOs,
    Debian,
    #[serde(rename = "ElementaryOS")]
    ElementaryOs,
    #[serde(rename = "ElementaryOS_0_3")]
    ElementaryOs03,
    #[serde(rename = "ElementaryOS_0_4")]
    ElementaryOs04,
    Fedora,
    #[serde(rename = "GalliumOS")]
    GalliumOs,
    LinuxMint,
    #[serde(rename = "OpenSUSE")]
    OpenSuse,
    OracleLinux,
    #[serde(rename = "RHEL")]
    Rhel,
    #[serde(rename = "SLES")]
    Sles,
    Ubuntu,
    #[serde(rename = "Ubuntu_14")]
    Ubuntu14,
    #[serde(rename = "Ubuntu_16")]
    Ubuntu16,
    #[serde(rename = "Ubuntu_18")]
    Ubuntu18,
    #[serde(rename = "Ubuntu_20")]
    Ubuntu20,
    #[serde(rename = "Ubuntu_22")]
    Ubuntu22,
}

impl Runtime {
    /// Every variant, `Unknown` included.
    pub const ALL: [Runtime; 26] = [
        Runtime::Unknown,
        Runtime::Windows,
        Runtime::Windows86,
        Runtime::Windows64,
        Runtime::WindowsArm64,
        Runtime::Osx,
        Runtime::OsxArm64,
        Runtime::Linux,
        Runtime::CentOs,
        Runtime::Debian,
        Runtime::ElementaryOs,
        Runtime::ElementaryOs03,
        Runtime::ElementaryOs04,
        Runtime::Fedora,
        Runtime::GalliumOs,
        Runtime::LinuxMint,
        Runtime::OpenSuse,
        Runtime::OracleLinux,
        Runtime::Rhel,
        Runtime::Sles,
        Runtime::Ubuntu,
        Runtime::Ubuntu14,
        Runtime::Ubuntu16,
        Runtime::Ubuntu18,
        Runtime::Ubuntu20,
        Runtime::Ubuntu22,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Runtime::Unknown => "Unknown",
            Runtime::Windows => "Windows",
            Runtime::Windows86 => "Windows_86",
            Runtime::Windows64 => "Windows_64",
            Runtime::WindowsArm64 => "Windows_ARM64",
            Runtime::Osx => "OSX",
            Runtime::OsxArm64 => "OSX_ARM64",
            Runtime::Linux => "Linux",
            Runtime::CentOs => "CentOS",
            Runtime::Debian => "Debian",
            Runtime::ElementaryOs => "ElementaryOS",
            Runtime::ElementaryOs03 => "ElementaryOS_0_3",
            Runtime::ElementaryOs04 => "ElementaryOS_0_4",
            Runtime::Fedora => "Fedora",
            Runtime::GalliumOs => "GalliumOS",
            Runtime::LinuxMint => "LinuxMint",
            Runtime::OpenSuse => "OpenSUSE",
            Runtime::OracleLinux => "OracleLinux",
            Runtime::Rhel => "RHEL",
            Runtime::Sles => "SLES",
            Runtime::Ubuntu => "Ubuntu",
            Runtime::Ubuntu14 => "Ubuntu_14",
            Runtime::Ubuntu16 => "Ubuntu_16",
            Runtime::Ubuntu18 => "Ubuntu_18",
            Runtime::Ubuntu20 => "Ubuntu_20",
            Runtime::Ubuntu22 => "Ubuntu_22",
        }
    }

    /// The next more general runtime, or `None` for the roots
    /// (Windows, OSX, Linux) and for `Unknown`.
    fn generalization(self) -> Option<Runtime> {
        match self {
            Runtime::Windows86 | Runtime::Windows64 | Runtime::WindowsArm64 => {
                Some(Runtime::Windows)
            }
            Runtime::OsxArm64 => Some(Runtime::Osx),

            Runtime::Ubuntu14
            | Runtime::Ubuntu16
            | Runtime::Ubuntu18
            | Runtime::Ubuntu20
            | Runtime::Ubuntu22 => Some(Runtime::Ubuntu),
            // Binary compatible with a specific Ubuntu release
            Runtime::ElementaryOs03 => Some(Runtime::Ubuntu14),
            Runtime::ElementaryOs04 | Runtime::GalliumOs | Runtime::LinuxMint => {
                Some(Runtime::Ubuntu16)
            }
            Runtime::OracleLinux => Some(Runtime::CentOs),

            Runtime::Ubuntu
            | Runtime::CentOs
            | Runtime::Debian
            | Runtime::ElementaryOs
            | Runtime::Fedora
            | Runtime::OpenSuse
            | Runtime::Rhel
            | Runtime::Sles => Some(Runtime::Linux),

            Runtime::Windows | Runtime::Osx | Runtime::Linux | Runtime::Unknown => None,
        }
    }

    /// Successively more general runtimes, most specific first, excluding
    /// `self`. Empty for Windows, OSX and Linux; an error for `Unknown`.
    pub fn fallback_chain(self) -> Result<Vec<Runtime>> {
        if self == Runtime::Unknown {
            return Err(Error::UnknownRuntime);
        }
        match self.generalization() {
            None => Ok(Vec::new()),
            Some(parent) => {
                let mut chain = vec![parent];
                chain.extend(parent.fallback_chain()?);
                Ok(chain)
            }
        }
    }

    /// `self` followed by its fallback chain.
    pub fn candidates(self) -> Result<Vec<Runtime>> {
        let mut candidates = vec![self];
        candidates.extend(self.fallback_chain()?);
        Ok(candidates)
    }

    /// Platform name substituted for `{#platform#}`: Windows, OSX or Linux.
    pub fn display_name(self) -> Result<&'static str> {
        let root = match self.candidates()?.last() {
            Some(root) => *root,
            None => return Err(Error::UnknownRuntime),
        };
        match root {
            Runtime::Windows => Ok("Windows"),
            Runtime::Osx => Ok("OSX"),
            Runtime::Linux => Ok("Linux"),
            _ => Err(Error::UnknownRuntime),
        }
    }

    pub fn is_linux(self) -> bool {
        matches!(self.display_name(), Ok("Linux"))
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Runtime {
    type Err = Error;

    /// Exact, case-sensitive match on the wire string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Runtime::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown runtime identifier '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ROOTS: [Runtime; 3] = [Runtime::Windows, Runtime::Osx, Runtime::Linux];

    #[test]
    fn test_fallback_chain_handles_every_runtime() {
        for runtime in Runtime::ALL {
            if runtime == Runtime::Unknown {
                assert!(matches!(
                    runtime.fallback_chain(),
                    Err(Error::UnknownRuntime)
                ));
                continue;
            }

            let chain = runtime
                .fallback_chain()
                .unwrap_or_else(|e| panic!("no fallback chain for {}: {}", runtime, e));

            assert!(!chain.contains(&runtime), "{} falls back to itself", runtime);
            assert!(!chain.contains(&Runtime::Unknown));

            let unique: HashSet<_> = chain.iter().collect();
            assert_eq!(unique.len(), chain.len(), "cycle in chain of {}", runtime);

            match chain.last() {
                Some(last) => assert!(ROOTS.contains(last), "{} ends at {}", runtime, last),
                None => assert!(ROOTS.contains(&runtime), "{} has an empty chain", runtime),
            }
        }
    }

    #[test]
    fn test_each_step_strictly_generalizes() {
        for runtime in Runtime::ALL.into_iter().filter(|r| *r != Runtime::Unknown) {
            let chain = runtime.fallback_chain().unwrap();
            // The tail after each step is exactly that step's own chain
            for (i, step) in chain.iter().enumerate() {
                assert_eq!(step.fallback_chain().unwrap(), chain[i + 1..].to_vec());
            }
        }
    }

    #[test]
    fn test_roots_have_empty_chain() {
        for root in ROOTS {
            assert!(root.fallback_chain().unwrap().is_empty());
        }
    }

    #[test]
    fn test_specific_chains() {
        assert_eq!(
            Runtime::Ubuntu16.fallback_chain().unwrap(),
            vec![Runtime::Ubuntu, Runtime::Linux]
        );
        assert_eq!(
            Runtime::ElementaryOs04.fallback_chain().unwrap(),
            vec![Runtime::Ubuntu16, Runtime::Ubuntu, Runtime::Linux]
        );
        assert_eq!(
            Runtime::OracleLinux.fallback_chain().unwrap(),
            vec![Runtime::CentOs, Runtime::Linux]
        );
        assert_eq!(
            Runtime::WindowsArm64.fallback_chain().unwrap(),
            vec![Runtime::Windows]
        );
        assert_eq!(Runtime::OsxArm64.fallback_chain().unwrap(), vec![Runtime::Osx]);
    }

    #[test]
    fn test_display_name_handles_every_runtime() {
        for runtime in Runtime::ALL {
            if runtime == Runtime::Unknown {
                assert!(runtime.display_name().is_err());
            } else {
                assert!(runtime.display_name().is_ok(), "{}", runtime);
            }
        }
        assert_eq!(Runtime::Windows86.display_name().unwrap(), "Windows");
        assert_eq!(Runtime::OsxArm64.display_name().unwrap(), "OSX");
        assert_eq!(Runtime::GalliumOs.display_name().unwrap(), "Linux");
    }

    #[test]
    fn test_wire_strings_round_trip() {
        let strings: HashSet<_> = Runtime::ALL.iter().map(|r| r.as_str()).collect();
        assert_eq!(strings.len(), Runtime::ALL.len());

        for runtime in Runtime::ALL {
            assert_eq!(runtime.as_str().parse::<Runtime>().unwrap(), runtime);
            let json = serde_json::to_string(&runtime).unwrap();
            assert_eq!(json, format!("\"{}\"", runtime.as_str()));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_strings() {
        assert!("ubuntu_16".parse::<Runtime>().is_err());
        assert!("Plan9".parse::<Runtime>().is_err());
    }

    #[test]
    fn test_is_linux() {
        assert!(Runtime::Ubuntu22.is_linux());
        assert!(Runtime::Linux.is_linux());
        assert!(!Runtime::Windows64.is_linux());
        assert!(!Runtime::Unknown.is_linux());
    }
}
