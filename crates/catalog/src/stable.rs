//! Derived single-value caches: the current stable and old-stable versions.
//!
//! These are independent of the catalog snapshot and carry their own 24h
//! TTL, since the authoritative stable endpoint is a separate (and much
//! smaller) fetch than the full listing.

use crate::catalog::{file_age, write_atomic};
use govm_core::{Config, Error, GoVersion, Result};
use govm_fetch::Transport;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

/// TTL for the stable/old-stable value files.
const STABLE_TTL: Duration = Duration::from_secs(86_400);

const STABLE_FILE: &str = "stable.txt";
const OLDSTABLE_FILE: &str = "oldstable.txt";

/// Cache of the authoritative "current stable" value and the old-stable
/// version derived from it.
pub struct StableCache {
    dir: PathBuf,
    url: String,
    force_refresh: bool,
}

impl StableCache {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.cache_dir.clone(),
            url: config.stable_url.clone(),
            force_refresh: config.force_refresh,
        }
    }

    /// The current stable version, from cache or the authoritative
    /// endpoint.
    ///
    /// # Errors
    ///
    /// [`Error::Fetch`] when the endpoint is unreachable and no cached
    /// value exists.
    pub async fn current_stable(&self, transport: &dyn Transport) -> Result<GoVersion> {
        if !self.force_refresh {
            if let Some(version) = self.read(STABLE_FILE, STABLE_TTL) {
                debug!(%version, "stable version from cache");
                return Ok(version);
            }
        }

        match self.fetch_stable(transport).await {
            Ok(version) => Ok(version),
            Err(e) => {
                // Expired cache beats no answer when offline.
                if let Some(stale) = self.read(STABLE_FILE, Duration::MAX) {
                    warn!(error = %e, "stable endpoint unreachable, using cached value");
                    Ok(stale)
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn fetch_stable(&self, transport: &dyn Transport) -> Result<GoVersion> {
        let body = transport.get(&self.url).await?;
        let text = String::from_utf8_lossy(&body);
        // The endpoint reports "go1.22.3" on the first line (a release
        // timestamp may follow on later lines).
        let first = text.lines().next().unwrap_or_default().trim();
        let version = GoVersion::parse(first)
            .ok_or_else(|| Error::fetch(&self.url, format!("unparseable stable version '{first}'")))?;
        self.write(STABLE_FILE, &version)?;
        Ok(version)
    }

    /// The cached old-stable value, if still within its TTL.
    #[must_use]
    pub fn cached_old_stable(&self) -> Option<GoVersion> {
        self.read(OLDSTABLE_FILE, STABLE_TTL)
    }

    /// Record a freshly computed old-stable value.
    pub fn store_old_stable(&self, version: &GoVersion) -> Result<()> {
        self.write(OLDSTABLE_FILE, version)
    }

    fn read(&self, file: &str, ttl: Duration) -> Option<GoVersion> {
        let path = self.dir.join(file);
        if file_age(&path)? > ttl {
            return None;
        }
        let text = std::fs::read_to_string(&path).ok()?;
        GoVersion::parse(text.trim())
    }

    fn write(&self, file: &str, version: &GoVersion) -> Result<()> {
        write_atomic(&self.dir.join(file), format!("{version}\n").as_bytes())
    }
}
