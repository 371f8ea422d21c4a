//! Install strategies and the per-mode fallback chains.
//!
//! The chain for each mode is a literal ordered list, iterated by the
//! orchestrator; there is no other control flow deciding what gets tried.

use govm_core::{InstallMode, ResolvedVersion};
use std::fmt;

/// One method of obtaining a working toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Reuse a prior binary install after validating it still runs.
    ExistingBinary,
    /// Reuse a prior source-built install after validating it still runs.
    ExistingSource,
    /// Download and unpack a precompiled distribution.
    PrecompiledBinary,
    /// Download a source distribution and run the external build step.
    SourceBuild,
    /// Check out the source repository and run the external build step.
    GitBuild,
}

impl Strategy {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ExistingBinary => "existing-binary",
            Self::ExistingSource => "existing-source",
            Self::PrecompiledBinary => "precompiled-binary",
            Self::SourceBuild => "source-build",
            Self::GitBuild => "git-build",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ordered strategies to try for `mode` and `resolved`.
///
/// A commit can only come from the repository, whatever the mode says.
/// Binary- and source-built releases share one record key space, so in
/// auto mode a single reuse probe covers both existing forms.
#[must_use]
pub fn chain(mode: InstallMode, resolved: &ResolvedVersion) -> &'static [Strategy] {
    if matches!(resolved, ResolvedVersion::Commit { .. }) {
        return &[Strategy::GitBuild];
    }
    match mode {
        InstallMode::Binary => &[Strategy::ExistingBinary, Strategy::PrecompiledBinary],
        InstallMode::Source => &[
            Strategy::ExistingSource,
            Strategy::SourceBuild,
            Strategy::GitBuild,
        ],
        InstallMode::Git => &[Strategy::GitBuild],
        InstallMode::Auto => &[
            Strategy::ExistingBinary,
            Strategy::PrecompiledBinary,
            Strategy::SourceBuild,
            Strategy::GitBuild,
        ],
    }
}
