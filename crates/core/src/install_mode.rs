//! Install mode: which chain of strategies the orchestrator may try.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How an installation may be obtained. Each mode maps to a fixed, ordered
/// strategy chain in the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    /// Reuse an existing install, then binary, then source, then git.
    #[default]
    Auto,
    /// Precompiled binary distribution only.
    Binary,
    /// Build from a source tarball, falling back to a git build.
    Source,
    /// Build from a git checkout only.
    Git,
}

impl InstallMode {
    /// Name as accepted by `GOVM_TYPE`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Binary => "binary",
            Self::Source => "source",
            Self::Git => "git",
        }
    }
}

impl fmt::Display for InstallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InstallMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "binary" => Ok(Self::Binary),
            "source" => Ok(Self::Source),
            "git" => Ok(Self::Git),
            other => Err(crate::Error::configuration(format!(
                "unknown install type '{other}' (expected auto, binary, source, or git)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        assert_eq!("auto".parse::<InstallMode>().unwrap(), InstallMode::Auto);
        assert_eq!("BINARY".parse::<InstallMode>().unwrap(), InstallMode::Binary);
        assert_eq!(InstallMode::Git.to_string(), "git");
        assert!("tarball".parse::<InstallMode>().is_err());
    }

    #[test]
    fn default_is_auto() {
        assert_eq!(InstallMode::default(), InstallMode::Auto);
    }
}
