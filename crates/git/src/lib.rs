//! Source-control checkout resolver.
//!
//! Turns an arbitrary ref (commit hash, branch, tag, or revision
//! expression) into a concrete commit in a local working clone of the Go
//! repository. Resolution is *not* a pure query: the working tree is hard
//! reset to whatever the ref resolves to, because a later build strategy
//! compiles exactly what is checked out.
//!
//! The probe order for symbolic names (branch before `go`-prefixed branch
//! before tags) is a compatibility contract: changing it changes which ref
//! wins for ambiguous names like `1.20` vs tag `go1.20`.

use govm_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// The primary branch of the Go repository; bare `@` normalizes to it and
/// relative revision expressions are parsed from it.
const PRIMARY_BRANCH: &str = "master";

/// Ref classification, in the order the resolver considers the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefKind {
    /// Looks like a raw commit hash: hex, at least 6 characters.
    CommitHash,
    /// A plain name worth probing as a branch or tag.
    Symbolic,
    /// Contains revision-modifier syntax (`@ ^ ~ : { }`); probing a name
    /// like that against remote refs could resolve to nonsense, so it goes
    /// straight to relative-expression parsing.
    Relative,
}

fn classify(git_ref: &str) -> RefKind {
    if git_ref.len() >= 6 && git_ref.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase())
    {
        RefKind::CommitHash
    } else if git_ref.contains(['@', '^', '~', ':', '{', '}']) {
        RefKind::Relative
    } else {
        RefKind::Symbolic
    }
}

/// A working clone of the Go repository plus the remote it tracks.
pub struct GitCheckout {
    repo_dir: PathBuf,
    remote: String,
}

impl GitCheckout {
    /// Describe a checkout at `repo_dir`, cloned from `remote` on demand.
    #[must_use]
    pub fn new(repo_dir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
        }
    }

    /// The working tree location.
    #[must_use]
    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    /// Clone the remote if no repository exists yet.
    pub async fn ensure_cloned(&self) -> Result<()> {
        if self.repo_dir.join(".git").exists() {
            return Ok(());
        }
        if let Some(parent) = self.repo_dir.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(e, "create clone parent directory"))?;
        }
        info!(remote = %self.remote, dir = %self.repo_dir.display(), "cloning");
        let output = Command::new("git")
            .arg("clone")
            .arg(&self.remote)
            .arg(&self.repo_dir)
            .output()
            .await
            .map_err(|e| Error::checkout(&self.remote, format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(Error::checkout(
                &self.remote,
                format!("clone failed: {}", String::from_utf8_lossy(&output.stderr)),
            ));
        }
        Ok(())
    }

    /// Resolve `git_ref` to a commit and hard-reset the working tree to it.
    /// Returns the short hash of the resulting commit.
    ///
    /// # Errors
    ///
    /// [`Error::Checkout`] when every applicable resolution form fails.
    pub async fn checkout(&self, git_ref: &str) -> Result<String> {
        self.ensure_cloned().await?;

        // Stale remote refs make branch probes resolve to old commits;
        // refresh them, but tolerate being offline.
        if let Err(e) = self.git(&["fetch", "--tags", "origin"]).await {
            warn!(error = %e, "fetch failed, resolving against local refs");
        }

        let git_ref = if git_ref == "@" { PRIMARY_BRANCH } else { git_ref };

        match classify(git_ref) {
            RefKind::CommitHash => {
                self.reset_hard(git_ref).await?;
                self.short_head().await
            }
            RefKind::Symbolic => {
                for candidate in symbolic_candidates(git_ref) {
                    if self.rev_verify(&candidate).await.is_some() {
                        debug!(%git_ref, %candidate, "resolved via symbolic probe");
                        self.reset_hard(&candidate).await?;
                        return self.short_head().await;
                    }
                }
                self.checkout_relative(git_ref).await
            }
            RefKind::Relative => self.checkout_relative(git_ref).await,
        }
    }

    /// Step 4: reset to the primary branch for a stable base, then parse
    /// the ref as a general revision expression relative to it.
    async fn checkout_relative(&self, git_ref: &str) -> Result<String> {
        self.reset_hard(&format!("origin/{PRIMARY_BRANCH}")).await?;
        let Some(sha) = self.rev_verify(git_ref).await else {
            return Err(Error::checkout(
                git_ref,
                "not a commit, branch, tag, or revision expression",
            ));
        };
        self.reset_hard(&sha).await?;
        self.short_head().await
    }

    async fn reset_hard(&self, object: &str) -> Result<()> {
        self.git(&["reset", "--hard", "--quiet", object])
            .await
            .map(|_| ())
            .map_err(|e| Error::checkout(object, format!("hard reset failed: {e}")))
    }

    /// `rev-parse --verify` of `<object>^{commit}`; `None` when the object
    /// does not resolve to a commit.
    async fn rev_verify(&self, object: &str) -> Option<String> {
        self.git(&[
            "rev-parse",
            "--verify",
            "--quiet",
            &format!("{object}^{{commit}}"),
        ])
        .await
        .ok()
    }

    async fn short_head(&self) -> Result<String> {
        self.git(&["rev-parse", "--short=12", "HEAD"]).await
    }

    /// Run git in the working clone, returning trimmed stdout.
    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_dir)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::checkout(args.join(" "), format!("failed to run git: {e}")))?;
        if !output.status.success() {
            return Err(Error::checkout(
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Probe order for symbolic refs. `origin/master` is only probed for the
/// literal `tip`, which has no branch of its own.
fn symbolic_candidates(git_ref: &str) -> Vec<String> {
    let mut candidates = vec![format!("origin/{git_ref}"), format!("origin/go{git_ref}")];
    if git_ref == "tip" {
        candidates.push(format!("origin/{PRIMARY_BRANCH}"));
    }
    candidates.push(format!("refs/tags/{git_ref}"));
    candidates.push(format!("refs/tags/go{git_ref}"));
    candidates
}
