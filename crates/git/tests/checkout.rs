//! Checkout resolution against a real throwaway repository.

use govm_git::GitCheckout;
use std::path::Path;
use std::process::Command;

/// Run git in `dir`, panicking on failure (fixture setup only).
fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.email=test@example.test",
            "-c",
            "user.name=test",
        ])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Upstream with: two commits on master, a release branch, and a go-prefixed
/// tag. Returns its path.
fn make_upstream(root: &Path) -> std::path::PathBuf {
    let upstream = root.join("upstream");
    std::fs::create_dir_all(&upstream).unwrap();
    git(&upstream, &["init", "-b", "master"]);

    std::fs::write(upstream.join("README"), "one").unwrap();
    git(&upstream, &["add", "."]);
    git(&upstream, &["commit", "-m", "first"]);

    git(&upstream, &["checkout", "-b", "release-branch.go1.20"]);
    std::fs::write(upstream.join("README"), "release").unwrap();
    git(&upstream, &["commit", "-am", "release work"]);

    git(&upstream, &["checkout", "master"]);
    std::fs::write(upstream.join("README"), "two").unwrap();
    git(&upstream, &["commit", "-am", "second"]);
    git(&upstream, &["tag", "go1.21.0", "HEAD~1"]);

    upstream
}

fn head_of(upstream: &Path, rev: &str) -> String {
    git(upstream, &["rev-parse", rev])
}

#[tokio::test]
async fn resolves_branch_tag_tip_and_relative_refs() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = make_upstream(tmp.path());
    let checkout = GitCheckout::new(tmp.path().join("clone"), upstream.to_string_lossy());

    // Branch probe: origin/<ref> wins before any tag or relative parsing.
    let sha = checkout.checkout("release-branch.go1.20").await.unwrap();
    assert!(head_of(&upstream, "release-branch.go1.20").starts_with(&sha));

    // go-prefixed tag probe: "1.21.0" has no branch, resolves via
    // refs/tags/go1.21.0.
    let sha = checkout.checkout("1.21.0").await.unwrap();
    assert!(head_of(&upstream, "go1.21.0^{commit}").starts_with(&sha));

    // tip falls through to origin/master.
    let sha = checkout.checkout("tip").await.unwrap();
    assert!(head_of(&upstream, "master").starts_with(&sha));

    // Bare @ is the primary branch.
    let sha = checkout.checkout("@").await.unwrap();
    assert!(head_of(&upstream, "master").starts_with(&sha));

    // Modifier syntax: parsed as a revision expression from master.
    let sha = checkout.checkout("master~1").await.unwrap();
    assert!(head_of(&upstream, "master~1").starts_with(&sha));
}

#[tokio::test]
async fn raw_commit_hash_resolves_directly() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = make_upstream(tmp.path());
    let first = head_of(&upstream, "master~1");
    let checkout = GitCheckout::new(tmp.path().join("clone"), upstream.to_string_lossy());

    let sha = checkout.checkout(&first).await.unwrap();
    assert!(first.starts_with(&sha));
    assert!(sha.len() >= 6);
}

#[tokio::test]
async fn unresolvable_ref_is_a_checkout_error() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = make_upstream(tmp.path());
    let checkout = GitCheckout::new(tmp.path().join("clone"), upstream.to_string_lossy());

    let err = checkout.checkout("no-such-branch").await.unwrap_err();
    assert!(matches!(err, govm_core::Error::Checkout { .. }));
}

#[tokio::test]
async fn checkout_mutates_the_working_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let upstream = make_upstream(tmp.path());
    let clone = tmp.path().join("clone");
    let checkout = GitCheckout::new(&clone, upstream.to_string_lossy());

    checkout.checkout("release-branch.go1.20").await.unwrap();
    assert_eq!(std::fs::read_to_string(clone.join("README")).unwrap(), "release");

    checkout.checkout("tip").await.unwrap();
    assert_eq!(std::fs::read_to_string(clone.join("README")).unwrap(), "two");
}
