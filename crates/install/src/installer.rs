//! Strategy orchestrator: tries each configured strategy in order until one
//! yields a complete install, then emits the record and its descriptor.

use crate::archive::unpack_distribution;
use crate::env::EnvDescriptor;
use crate::record::RecordPaths;
use crate::strategy::{chain, Strategy};
use govm_core::{Config, Error, GoVersion, ResolvedVersion, Result};
use govm_fetch::{fetch_verified, Transport};
use govm_git::GitCheckout;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A completed installation.
#[derive(Debug, Clone)]
pub struct InstallRecord {
    /// Record name, e.g. `go1.21.5.linux.amd64`.
    pub name: String,
    /// Toolchain root.
    pub goroot: std::path::PathBuf,
    /// Where the descriptor lives.
    pub descriptor_path: std::path::PathBuf,
    /// The strategy that produced this install.
    pub strategy: Strategy,
}

/// Record plus the activation environment callers source.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    pub record: InstallRecord,
    /// Rendered activation environment, exactly as persisted on disk.
    pub env: String,
}

/// Orchestrates the strategy chain for one resolved version.
pub struct Installer<'a> {
    config: &'a Config,
}

impl<'a> Installer<'a> {
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Install `resolved`, trying each strategy of the configured mode in
    /// order.
    ///
    /// # Errors
    ///
    /// [`Error::StrategyExhausted`] carrying the last strategy's error when
    /// nothing in the chain succeeds.
    pub async fn install(
        &self,
        transport: &dyn Transport,
        resolved: &ResolvedVersion,
    ) -> Result<InstallOutcome> {
        let paths = RecordPaths::for_resolved(self.config, resolved);
        if self.config.force_reinstall {
            paths.remove()?;
        }

        let mode = self.config.install_mode;
        let mut last: Option<Error> = None;
        for &strategy in chain(mode, resolved) {
            info!(%strategy, version = %resolved, "attempting install strategy");
            match self.run(strategy, transport, resolved, &paths).await {
                Ok(outcome) => {
                    info!(%strategy, record = %outcome.record.name, "installed");
                    return Ok(outcome);
                }
                Err(e) => {
                    warn!(%strategy, error = %e, "strategy failed");
                    last = Some(e);
                }
            }
        }

        Err(Error::StrategyExhausted {
            mode,
            last: Box::new(
                last.unwrap_or_else(|| Error::configuration("no strategies configured")),
            ),
        })
    }

    async fn run(
        &self,
        strategy: Strategy,
        transport: &dyn Transport,
        resolved: &ResolvedVersion,
        paths: &RecordPaths,
    ) -> Result<InstallOutcome> {
        match strategy {
            Strategy::ExistingBinary | Strategy::ExistingSource => {
                self.existing(strategy, resolved, paths).await
            }
            Strategy::PrecompiledBinary => self.precompiled(transport, resolved, paths).await,
            Strategy::SourceBuild => self.source_build(transport, resolved, paths).await,
            Strategy::GitBuild => self.git_build(resolved).await,
        }
    }

    /// Reuse a prior record: no network, no build. The record must exist
    /// and its binary must still run and report the expected version; a
    /// partial tree left by a killed install fails this probe and the
    /// chain moves on to a fresh install.
    async fn existing(
        &self,
        strategy: Strategy,
        resolved: &ResolvedVersion,
        paths: &RecordPaths,
    ) -> Result<InstallOutcome> {
        if !paths.exists() {
            return Err(Error::not_found(format!("no existing record {}", paths.name)));
        }
        self.accept(&paths.goroot, expected_release(resolved)).await?;
        debug!(record = %paths.name, "reusing existing install");
        // The persisted descriptor is returned as-is; reuse never rewrites it.
        self.outcome(strategy, paths, false)
    }

    /// Download, verify, and unpack a precompiled distribution.
    async fn precompiled(
        &self,
        transport: &dyn Transport,
        resolved: &ResolvedVersion,
        paths: &RecordPaths,
    ) -> Result<InstallOutcome> {
        let version = expected_release(resolved).ok_or_else(|| {
            Error::configuration("precompiled strategy requires a release version")
        })?;
        let artifact = format!(
            "go{version}.{}-{}.tar.gz",
            self.config.target.os, self.config.target.arch
        );
        let tarball = self.fetch_artifact(transport, &artifact).await?;
        unpack_distribution(&tarball, &paths.goroot)?;
        let _ = std::fs::remove_file(&tarball);

        self.accept(&paths.goroot, Some(version)).await?;
        self.outcome(Strategy::PrecompiledBinary, paths, true)
    }

    /// Download a source distribution and run the external build step.
    async fn source_build(
        &self,
        transport: &dyn Transport,
        resolved: &ResolvedVersion,
        paths: &RecordPaths,
    ) -> Result<InstallOutcome> {
        let version = expected_release(resolved)
            .ok_or_else(|| Error::configuration("source strategy requires a release version"))?;
        let artifact = format!("go{version}.src.tar.gz");
        let tarball = self.fetch_artifact(transport, &artifact).await?;
        unpack_distribution(&tarball, &paths.goroot)?;
        let _ = std::fs::remove_file(&tarball);

        run_build(&paths.goroot).await?;
        self.accept(&paths.goroot, Some(version)).await?;
        if self.config.self_check {
            self_check(&paths.goroot).await?;
        }
        self.outcome(Strategy::SourceBuild, paths, true)
    }

    /// Check the repository out at the wanted ref and build in place. All
    /// git builds live in the shared clone and publish the singleton
    /// descriptor.
    async fn git_build(&self, resolved: &ResolvedVersion) -> Result<InstallOutcome> {
        let checkout = GitCheckout::new(self.config.git_clone_dir(), &self.config.git_remote);
        let git_ref = match resolved {
            ResolvedVersion::Commit { short_sha, .. } => short_sha.clone(),
            // A release built from git resolves through the tag probes
            // (refs/tags/go<version>).
            ResolvedVersion::Release(version) => version.to_string(),
        };
        checkout.checkout(&git_ref).await?;

        let paths = RecordPaths::git(self.config);
        run_build(&paths.goroot).await?;
        probe_binary(&paths.goroot, None).await?;
        if self.config.self_check {
            self_check(&paths.goroot).await?;
        }
        self.outcome(Strategy::GitBuild, &paths, true)
    }

    async fn fetch_artifact(
        &self,
        transport: &dyn Transport,
        artifact: &str,
    ) -> Result<std::path::PathBuf> {
        let candidates = vec![
            format!("{}/{artifact}", self.config.download_base.trim_end_matches('/')),
            format!("{}/{artifact}", self.config.download_mirror.trim_end_matches('/')),
        ];
        std::fs::create_dir_all(&self.config.tmp_dir)
            .map_err(|e| Error::io(e, "create temp directory"))?;
        fetch_verified(transport, &candidates, &self.config.tmp_dir.join(artifact)).await
    }

    /// Acceptance check for an unpacked or built tree. Host-native targets
    /// are validated by running the binary; a cross-target binary cannot
    /// execute here, so only the tree layout is checked.
    async fn accept(&self, goroot: &Path, expected: Option<&GoVersion>) -> Result<()> {
        if self.config.target_is_host() {
            probe_binary(goroot, expected).await?;
        } else {
            check_layout(goroot)?;
        }
        Ok(())
    }

    /// Build the record and activation environment. Fresh installs
    /// (`persist`) write the descriptor and refresh the alias; reuse reads
    /// the persisted descriptor back verbatim instead of recomputing it, so
    /// a config change after install never silently alters the echoed
    /// environment.
    fn outcome(
        &self,
        strategy: Strategy,
        paths: &RecordPaths,
        persist: bool,
    ) -> Result<InstallOutcome> {
        let env = if persist {
            let descriptor = EnvDescriptor::describe(self.config, &paths.goroot);
            descriptor.write(&paths.descriptor)?;
            descriptor.write_alias(self.config)?;
            descriptor.render()
        } else {
            std::fs::read_to_string(&paths.descriptor)
                .map_err(|e| Error::io(e, "read env descriptor"))?
        };
        Ok(InstallOutcome {
            record: InstallRecord {
                name: paths.name.clone(),
                goroot: paths.goroot.clone(),
                descriptor_path: paths.descriptor.clone(),
                strategy,
            },
            env,
        })
    }
}

/// Structural check for a tree whose binary cannot run on this host: the
/// distribution must at least have put a `bin/go` in place.
fn check_layout(goroot: &Path) -> Result<()> {
    let bin = goroot.join("bin").join("go");
    if bin.is_file() {
        Ok(())
    } else {
        Err(Error::build(
            goroot.display().to_string(),
            "install tree has no bin/go",
        ))
    }
}

/// The release version an install should report, if this is one.
fn expected_release(resolved: &ResolvedVersion) -> Option<&GoVersion> {
    match resolved {
        ResolvedVersion::Release(version) => Some(version),
        ResolvedVersion::Commit { .. } => None,
    }
}

/// Execute the installed toolchain and check it reports the expected
/// version. This is the runnability gate for reuse and the acceptance
/// check after unpack/build.
async fn probe_binary(goroot: &Path, expected: Option<&GoVersion>) -> Result<String> {
    let bin = goroot.join("bin").join("go");
    let output = Command::new(&bin)
        .arg("version")
        .env("GOROOT", goroot)
        .output()
        .await
        .map_err(|e| {
            Error::build(
                goroot.display().to_string(),
                format!("failed to execute {}: {e}", bin.display()),
            )
        })?;
    if !output.status.success() {
        return Err(Error::build(
            goroot.display().to_string(),
            format!(
                "go version exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }
    let report = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if let Some(version) = expected {
        let tag = format!("go{version}");
        let matches = report
            .split_whitespace()
            .any(|word| word == tag);
        if !matches {
            return Err(Error::build(
                goroot.display().to_string(),
                format!("toolchain reports '{report}', expected {tag}"),
            ));
        }
    }
    debug!(goroot = %goroot.display(), %report, "binary probe ok");
    Ok(report)
}

/// Invoke the external build step (`src/make.bash`). The actual compiler
/// bootstrap is out of govm's hands; only its exit status matters here.
async fn run_build(goroot: &Path) -> Result<()> {
    let src = goroot.join("src");
    let script = src.join("make.bash");
    if !script.exists() {
        return Err(Error::build(
            src.display().to_string(),
            "make.bash not found",
        ));
    }
    info!(dir = %src.display(), "running build step");
    let output = Command::new("./make.bash")
        .current_dir(&src)
        .output()
        .await
        .map_err(|e| {
            Error::build(src.display().to_string(), format!("failed to run make.bash: {e}"))
        })?;
    if !output.status.success() {
        return Err(Error::build(
            src.display().to_string(),
            format!(
                "make.bash exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        ));
    }
    Ok(())
}

/// Extended post-install check: the freshly built toolchain must be able
/// to report its own environment. Failure is fatal to the owning strategy.
async fn self_check(goroot: &Path) -> Result<()> {
    let bin = goroot.join("bin").join("go");
    let output = Command::new(&bin)
        .args(["env", "GOROOT"])
        .env("GOROOT", goroot)
        .output()
        .await
        .map_err(|e| {
            Error::build(goroot.display().to_string(), format!("self-check failed to run: {e}"))
        })?;
    if !output.status.success() || output.stdout.is_empty() {
        return Err(Error::build(
            goroot.display().to_string(),
            "self-check failed: go env produced no output",
        ));
    }
    Ok(())
}
