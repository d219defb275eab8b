//! Platform detection and runtime identification
//!
//! This module turns host facts (OS, CPU architecture, Linux distribution)
//! into a canonical [`Runtime`] and knows how each runtime generalizes when
//! no package exists for it.

mod detection;
mod distro;
mod runtime;

pub use detection::{
    PlatformInformation, RUNTIME_OVERRIDE_ENV, is_linux_platform, resolve_runtime, runtime_override,
};
pub use distro::LinuxDistribution;
pub use runtime::Runtime;
