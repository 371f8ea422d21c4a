//! Time-limited local snapshot of the published version catalog.
//!
//! A refresh either fully replaces the snapshot file (write temp, then
//! rename) or leaves the previous one untouched; readers never observe a
//! partial snapshot. When the network is down and an expired snapshot
//! exists, the stale snapshot is served with a warning rather than failing
//! the whole operation.

use govm_core::{Config, Error, GoVersion, Result};
use govm_fetch::Transport;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Snapshot file name under the cache directory.
const SNAPSHOT_FILE: &str = "known-versions.json";

/// Version-sorted, deduplicated set of published versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSnapshot {
    /// Listing URL the snapshot was scraped from.
    pub source: String,
    /// Ascending by version order.
    pub versions: Vec<GoVersion>,
}

impl CatalogSnapshot {
    /// Highest version matching the wildcard `base` (e.g. `1.21`), if any.
    #[must_use]
    pub fn latest_matching(&self, base: &str) -> Option<&GoVersion> {
        self.versions.iter().rfind(|v| v.matches_prefix(base))
    }
}

/// On-disk catalog cache with time-based invalidation.
pub struct CatalogCache {
    path: PathBuf,
    url: String,
    ttl: Duration,
    force_refresh: bool,
}

impl CatalogCache {
    /// Cache described by the run configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            path: config.cache_dir.join(SNAPSHOT_FILE),
            url: config.list_url.clone(),
            ttl: config.cache_ttl,
            force_refresh: config.force_refresh,
        }
    }

    /// Return the current snapshot, refreshing it when absent, expired, or
    /// force-refresh is set.
    ///
    /// # Errors
    ///
    /// [`Error::Fetch`] when a refresh is needed, the network fails, and no
    /// prior snapshot exists to fall back on.
    pub async fn get(&self, transport: &dyn Transport) -> Result<CatalogSnapshot> {
        if !self.force_refresh {
            if let Some(snapshot) = self.load_fresh() {
                debug!(path = %self.path.display(), "catalog snapshot is fresh");
                return Ok(snapshot);
            }
        }

        match self.refresh(transport).await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                // Offline with an expired snapshot: stale beats nothing.
                if let Some(stale) = self.load_any() {
                    warn!(error = %e, "catalog refresh failed, using stale snapshot");
                    Ok(stale)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Fetch the listing, parse it, and atomically replace the snapshot.
    async fn refresh(&self, transport: &dyn Transport) -> Result<CatalogSnapshot> {
        let body = transport.get(&self.url).await?;
        let text = String::from_utf8_lossy(&body);
        let versions = parse_listing(&text);
        if versions.is_empty() {
            return Err(Error::fetch(&self.url, "listing contained no versions"));
        }

        let snapshot = CatalogSnapshot {
            source: self.url.clone(),
            versions,
        };
        self.store(&snapshot)?;
        info!(count = snapshot.versions.len(), "catalog refreshed");
        Ok(snapshot)
    }

    /// Load the snapshot only if it is within the TTL window.
    fn load_fresh(&self) -> Option<CatalogSnapshot> {
        let age = file_age(&self.path)?;
        if age > self.ttl {
            return None;
        }
        self.load_any()
    }

    /// Load whatever snapshot exists, regardless of age.
    fn load_any(&self) -> Option<CatalogSnapshot> {
        let data = std::fs::read(&self.path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    fn store(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        write_atomic(&self.path, &serde_json::to_vec_pretty(snapshot).map_err(
            |e| Error::configuration(format!("failed to encode snapshot: {e}")),
        )?)
    }
}

/// Extract version tokens (`go<version>.src.tar.gz`) from the listing text,
/// deduplicate, and version-sort ascending. Comparison is structural; the
/// regex only locates tokens.
fn parse_listing(text: &str) -> Vec<GoVersion> {
    #[allow(clippy::unwrap_used)]
    let token = Regex::new(r"go([0-9][0-9A-Za-z.]*)\.src\.tar\.gz").unwrap();
    let mut versions: Vec<GoVersion> = token
        .captures_iter(text)
        .filter_map(|c| GoVersion::parse(&c[1]))
        .collect();
    versions.sort();
    versions.dedup();
    versions
}

/// Age of a file by mtime; `None` when it does not exist.
pub(crate) fn file_age(path: &Path) -> Option<Duration> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(modified.elapsed().unwrap_or_default())
}

/// Write via a hidden temp sibling and rename, never leaving a partial file.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io(e, "create cache directory"))?;
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("cache");
    let tmp = path.with_file_name(format!(".{name}.tmp"));
    std::fs::write(&tmp, data).map_err(|e| Error::io(e, "write cache file"))?;
    std::fs::rename(&tmp, path).map_err(|e| Error::io(e, "rename cache file into place"))
}
