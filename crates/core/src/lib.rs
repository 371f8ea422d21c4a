//! Core types for govm: errors, configuration, platform and version model.

pub mod config;
mod error;
mod install_mode;
pub mod platform;
pub mod version;

pub use config::Config;
pub use error::{Error, Result};
pub use install_mode::InstallMode;
pub use platform::{Arch, Os, Platform};
pub use version::{GoVersion, ResolvedVersion, VersionSpec};
