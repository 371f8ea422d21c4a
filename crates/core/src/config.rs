//! Immutable run configuration.
//!
//! Every tunable comes from a `GOVM_*` environment variable with a default;
//! defaults are applied exactly once in [`Config::from_env`] and the
//! resulting value is threaded by reference through every component. Nothing
//! downstream reads the process environment again.

use crate::platform::{Arch, Os, Platform};
use crate::{Error, InstallMode, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default catalog cache TTL: three hours.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 10_800;

/// Default download base for release artifacts.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://storage.googleapis.com/golang";

/// Default mirror for release artifacts.
pub const DEFAULT_DOWNLOAD_MIRROR: &str = "https://go.dev/dl";

/// Default catalog listing URL.
pub const DEFAULT_LIST_URL: &str = "https://go.dev/dl/";

/// Default authoritative endpoint for the current stable version.
pub const DEFAULT_STABLE_URL: &str = "https://go.dev/VERSION?m=text";

/// Default remote for source-control builds.
pub const DEFAULT_GIT_REMOTE: &str = "https://github.com/golang/go";

/// Immutable configuration for one govm invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Platform being installed for.
    pub target: Platform,
    /// Platform govm is running on.
    pub host: Platform,
    /// Strategy chain selector.
    pub install_mode: InstallMode,
    /// Root for per-version install trees and the shared git clone.
    pub version_prefix: PathBuf,
    /// Directory for environment descriptor files.
    pub env_prefix: PathBuf,
    /// Directory for the catalog snapshot and derived caches.
    pub cache_dir: PathBuf,
    /// Scratch space for downloads.
    pub tmp_dir: PathBuf,
    /// Base URL for release artifacts (primary download location).
    pub download_base: String,
    /// Mirror base URL for release artifacts.
    pub download_mirror: String,
    /// Catalog listing URL.
    pub list_url: String,
    /// Single-value endpoint reporting the current stable version.
    pub stable_url: String,
    /// Catalog snapshot time-to-live.
    pub cache_ttl: Duration,
    /// Remote cloned for git-based installs and ref resolution.
    pub git_remote: String,
    /// Wipe any existing record before installing.
    pub force_reinstall: bool,
    /// Refresh the catalog snapshot even inside the TTL window.
    pub force_refresh: bool,
    /// Explicit CGO_ENABLED value for generated descriptors.
    pub cgo_enabled: Option<bool>,
    /// Explicit CC value for generated descriptors.
    pub cc: Option<String>,
    /// Suppress the post-install descriptor echo.
    pub silent_env: bool,
    /// Never publish or refresh the `latest` alias.
    pub no_alias: bool,
    /// Run the extended post-install check after source/git builds.
    pub self_check: bool,
}

impl Config {
    /// Build the configuration from `GOVM_*` environment variables,
    /// applying defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for unparseable values (unknown
    /// OS/arch names, a bad install type, a non-numeric TTL) or when no
    /// home directory can be determined for the default roots.
    pub fn from_env() -> Result<Self> {
        let host = Platform {
            os: match env_var("GOVM_HOST_OS") {
                Some(s) => Os::parse(&s)
                    .ok_or_else(|| Error::configuration(format!("unknown host OS '{s}'")))?,
                None => Os::current(),
            },
            arch: match env_var("GOVM_HOST_ARCH") {
                Some(s) => Arch::parse(&s)
                    .ok_or_else(|| Error::configuration(format!("unknown host arch '{s}'")))?,
                None => Arch::current(),
            },
        };
        let target = Platform {
            os: match env_var("GOVM_OS") {
                Some(s) => Os::parse(&s)
                    .ok_or_else(|| Error::configuration(format!("unknown target OS '{s}'")))?,
                None => host.os,
            },
            arch: match env_var("GOVM_ARCH") {
                Some(s) => Arch::parse(&s)
                    .ok_or_else(|| Error::configuration(format!("unknown target arch '{s}'")))?,
                None => host.arch,
            },
        };

        let install_mode = match env_var("GOVM_TYPE") {
            Some(s) => s.parse()?,
            None => InstallMode::default(),
        };

        let home_root = || -> Result<PathBuf> {
            dirs::home_dir()
                .map(|home| home.join(".govm"))
                .ok_or_else(|| Error::configuration("could not determine home directory"))
        };

        let version_prefix = match env_var("GOVM_VERSION_PREFIX") {
            Some(dir) => PathBuf::from(dir),
            None => home_root()?.join("versions"),
        };
        let env_prefix = match env_var("GOVM_ENV_PREFIX") {
            Some(dir) => PathBuf::from(dir),
            None => home_root()?.join("envs"),
        };
        let cache_dir = match env_var("GOVM_CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => home_root()?.join("cache"),
        };
        let tmp_dir = env_var("GOVM_TMP").map_or_else(std::env::temp_dir, PathBuf::from);

        let cache_ttl = match env_var("GOVM_CACHE_TTL") {
            Some(s) => Duration::from_secs(s.parse().map_err(|_| {
                Error::configuration(format!("GOVM_CACHE_TTL must be a number of seconds, got '{s}'"))
            })?),
            None => Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
        };

        let cgo_enabled = match env_var("GOVM_CGO_ENABLED") {
            Some(s) => Some(matches!(s.as_str(), "1" | "true" | "yes")),
            None => None,
        };

        let download_base =
            env_var("GOVM_DOWNLOAD_BASE").unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE.to_string());
        let download_mirror =
            env_var("GOVM_DOWNLOAD_MIRROR").unwrap_or_else(|| DEFAULT_DOWNLOAD_MIRROR.to_string());

        Ok(Self {
            target,
            host,
            install_mode,
            version_prefix,
            env_prefix,
            cache_dir,
            tmp_dir,
            download_base,
            download_mirror,
            list_url: env_var("GOVM_LIST_URL").unwrap_or_else(|| DEFAULT_LIST_URL.to_string()),
            stable_url: env_var("GOVM_STABLE_URL").unwrap_or_else(|| DEFAULT_STABLE_URL.to_string()),
            cache_ttl,
            git_remote: env_var("GOVM_GO_GIT_REMOTE")
                .unwrap_or_else(|| DEFAULT_GIT_REMOTE.to_string()),
            force_reinstall: env_flag("GOVM_FORCE_REINSTALL"),
            force_refresh: env_flag("GOVM_FORCE_LIST_REFRESH"),
            cgo_enabled,
            cc: env_var("GOVM_CC"),
            silent_env: env_flag("GOVM_SILENT_ENV"),
            no_alias: env_flag("GOVM_NO_ALIAS"),
            self_check: env_flag("GOVM_SELF_CHECK"),
        })
    }

    /// A configuration rooted entirely under `root`, for tests and
    /// sandboxed runs. Network endpoints keep their defaults; flags are off.
    #[must_use]
    pub fn for_root(root: &Path) -> Self {
        Self {
            target: Platform::host(),
            host: Platform::host(),
            install_mode: InstallMode::default(),
            version_prefix: root.join("versions"),
            env_prefix: root.join("envs"),
            cache_dir: root.join("cache"),
            tmp_dir: root.join("tmp"),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            download_mirror: DEFAULT_DOWNLOAD_MIRROR.to_string(),
            list_url: DEFAULT_LIST_URL.to_string(),
            stable_url: DEFAULT_STABLE_URL.to_string(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            git_remote: DEFAULT_GIT_REMOTE.to_string(),
            force_reinstall: false,
            force_refresh: false,
            cgo_enabled: None,
            cc: None,
            silent_env: false,
            no_alias: false,
            self_check: false,
        }
    }

    /// Whether the install target matches the host platform.
    #[must_use]
    pub fn target_is_host(&self) -> bool {
        self.target == self.host
    }

    /// Path of the shared git working clone.
    #[must_use]
    pub fn git_clone_dir(&self) -> PathBuf {
        self.version_prefix.join("go")
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> bool {
    env_var(name).is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_root_places_everything_under_root() {
        let cfg = Config::for_root(Path::new("/tmp/govm-test"));
        assert!(cfg.version_prefix.starts_with("/tmp/govm-test"));
        assert!(cfg.env_prefix.starts_with("/tmp/govm-test"));
        assert!(cfg.cache_dir.starts_with("/tmp/govm-test"));
        assert_eq!(cfg.git_clone_dir(), Path::new("/tmp/govm-test/versions/go"));
        assert!(cfg.target_is_host());
    }

    #[test]
    fn default_ttl_is_three_hours() {
        let cfg = Config::for_root(Path::new("/tmp/x"));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(10_800));
    }
}
