//! Version resolver: one specifier in, one concrete version or commit out.
//!
//! Resolution is deterministic for a given catalog snapshot and repository
//! state. Symbolic and source-control specifiers delegate to the checkout
//! resolver, which means resolving them checks the working clone out.

use crate::{CatalogCache, StableCache};
use govm_core::{Config, Error, GoVersion, ResolvedVersion, Result, VersionSpec};
use govm_fetch::Transport;
use govm_git::GitCheckout;
use tracing::{debug, info};

/// Resolves version specifiers against the catalog, the stable endpoint,
/// and the shared git clone.
pub struct Resolver<'a> {
    config: &'a Config,
    catalog: CatalogCache,
    stable: StableCache,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            catalog: CatalogCache::new(config),
            stable: StableCache::new(config),
        }
    }

    /// Resolve `spec` to a concrete release version or commit.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for well-formed specifiers matching nothing,
    /// [`Error::Fetch`] / [`Error::Checkout`] for collaborator failures.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        spec: &VersionSpec,
    ) -> Result<ResolvedVersion> {
        debug!(%spec, "resolving");
        match spec {
            VersionSpec::Stable => {
                let version = self.stable.current_stable(transport).await?;
                Ok(ResolvedVersion::Release(version))
            }
            VersionSpec::OldStable => {
                let version = self.resolve_old_stable(transport).await?;
                Ok(ResolvedVersion::Release(version))
            }
            VersionSpec::Wildcard(base) => {
                let version = self.resolve_wildcard(transport, base).await?;
                Ok(ResolvedVersion::Release(version))
            }
            // An exact version is passed through as a candidate; whether it
            // actually exists surfaces when the install strategies fetch it.
            VersionSpec::Exact(version) => Ok(ResolvedVersion::Release(version.clone())),
            VersionSpec::Tip => self.resolve_ref("tip").await,
            VersionSpec::SourceRef(git_ref) => self.resolve_ref(git_ref).await,
        }
    }

    /// Highest catalog entry under the wildcard base.
    async fn resolve_wildcard(&self, transport: &dyn Transport, base: &str) -> Result<GoVersion> {
        let snapshot = self.catalog.get(transport).await?;
        snapshot
            .latest_matching(base)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{base}.x")))
    }

    /// Old stable: the newest release one minor version behind current
    /// stable. Cached in its own derived file with a 24h TTL.
    async fn resolve_old_stable(&self, transport: &dyn Transport) -> Result<GoVersion> {
        if !self.config.force_refresh {
            if let Some(cached) = self.stable.cached_old_stable() {
                debug!(%cached, "old-stable from cache");
                return Ok(cached);
            }
        }

        let stable = self.stable.current_stable(transport).await?;
        if stable.minor == 0 {
            return Err(Error::not_found(format!(
                "oldstable (nothing precedes {stable})"
            )));
        }
        let base = format!("{}.{}", stable.major, stable.minor - 1);
        info!(%stable, search = %base, "computing old-stable");
        let version = self.resolve_wildcard(transport, &base).await?;
        self.stable.store_old_stable(&version)?;
        Ok(version)
    }

    /// Delegate to the checkout resolver against the shared clone,
    /// creating the clone from the configured remote on first use.
    async fn resolve_ref(&self, git_ref: &str) -> Result<ResolvedVersion> {
        let checkout = GitCheckout::new(self.config.git_clone_dir(), &self.config.git_remote);
        let short_sha = checkout.checkout(git_ref).await?;
        Ok(ResolvedVersion::Commit {
            short_sha,
            spec: git_ref.to_string(),
        })
    }
}
