//! Artifact retrieval for govm.
//!
//! [`fetch_verified`] walks an ordered list of candidate URLs. Each
//! candidate is verified against its `.sha256` sidecar when one is
//! published; a digest mismatch abandons that candidate and moves on, a
//! missing sidecar accepts the artifact unverified. The first good
//! candidate wins. Only when every candidate has failed does the fetch
//! fail, and any partial artifact is removed.

mod transport;

use govm_core::{Error, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use transport::{HttpTransport, MockTransport, Transport};

/// Download the artifact at one of `candidates` into `dest`, verifying
/// against a `.sha256` sidecar where available.
///
/// The write is temp-then-rename, so a concurrent reader of `dest` never
/// observes a partial file.
///
/// # Errors
///
/// Returns [`Error::Fetch`] carrying the last attempted URL once every
/// candidate has been exhausted.
pub async fn fetch_verified(
    transport: &dyn Transport,
    candidates: &[String],
    dest: &Path,
) -> Result<PathBuf> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(e, "create download directory"))?;
    }

    let mut last_err = Error::fetch("", "no candidate URLs");
    for url in candidates {
        let body = match transport.get(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "candidate fetch failed, trying next");
                last_err = e;
                continue;
            }
        };

        match transport.get(&format!("{url}.sha256")).await {
            Ok(digest_body) => {
                let expected = String::from_utf8_lossy(&digest_body);
                let expected = expected.split_whitespace().next().unwrap_or_default();
                let actual = hex::encode(Sha256::digest(&body));
                if !actual.eq_ignore_ascii_case(expected) {
                    warn!(%url, %expected, %actual, "checksum mismatch, abandoning candidate");
                    last_err = Error::fetch(url, format!("sha256 mismatch: expected {expected}"));
                    continue;
                }
                debug!(%url, sha256 = %actual, "checksum verified");
            }
            Err(_) => {
                debug!(%url, "no sha256 sidecar published, accepting unverified");
            }
        }

        write_atomic(dest, &body).await?;
        info!(%url, dest = %dest.display(), "artifact fetched");
        return Ok(dest.to_path_buf());
    }

    // Nothing usable: make sure no partial artifact from an earlier run
    // survives to confuse a resume.
    if dest.exists() {
        let _ = tokio::fs::remove_file(dest).await;
    }
    Err(last_err)
}

/// Write `data` to `dest` via a temp sibling and an atomic rename.
async fn write_atomic(dest: &Path, data: &[u8]) -> Result<()> {
    let tmp = temp_sibling(dest);
    tokio::fs::write(&tmp, data)
        .await
        .map_err(|e| Error::io(e, "write artifact"))?;
    tokio::fs::rename(&tmp, dest)
        .await
        .map_err(|e| Error::io(e, "rename artifact into place"))
}

/// `.name.tmp` next to `dest`, so the rename stays on one filesystem.
fn temp_sibling(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    dest.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    #[tokio::test]
    async fn first_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("go.tar.gz");
        let transport = MockTransport::new()
            .with("https://a.test/go.tar.gz", "payload-a")
            .with("https://b.test/go.tar.gz", "payload-b");

        let path = fetch_verified(
            &transport,
            &[
                "https://a.test/go.tar.gz".to_string(),
                "https://b.test/go.tar.gz".to_string(),
            ],
            &dest,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"payload-a");
        // One artifact fetch plus one sidecar probe; the second candidate
        // was never touched.
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn verifies_sidecar_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("go.tar.gz");
        let transport = MockTransport::new()
            .with("https://a.test/go.tar.gz", "payload")
            .with(
                "https://a.test/go.tar.gz.sha256",
                sha256_hex(b"payload"),
            );

        fetch_verified(&transport, &["https://a.test/go.tar.gz".to_string()], &dest)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn mismatch_falls_through_to_next_candidate() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("go.tar.gz");
        let transport = MockTransport::new()
            .with("https://a.test/go.tar.gz", "tampered")
            .with("https://a.test/go.tar.gz.sha256", sha256_hex(b"payload"))
            .with("https://b.test/go.tar.gz", "payload")
            .with("https://b.test/go.tar.gz.sha256", sha256_hex(b"payload"));

        let path = fetch_verified(
            &transport,
            &[
                "https://a.test/go.tar.gz".to_string(),
                "https://b.test/go.tar.gz".to_string(),
            ],
            &dest,
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(path).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn exhaustion_removes_partial_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("go.tar.gz");
        // Leftover from a previous interrupted run.
        std::fs::write(&dest, b"partial").unwrap();

        let transport = MockTransport::new();
        let err = fetch_verified(
            &transport,
            &["https://a.test/go.tar.gz".to_string()],
            &dest,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Fetch { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn digest_whitespace_and_case_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("go.tar.gz");
        let digest = format!("{}  go.tar.gz\n", sha256_hex(b"payload").to_uppercase());
        let transport = MockTransport::new()
            .with("https://a.test/go.tar.gz", "payload")
            .with("https://a.test/go.tar.gz.sha256", digest);

        fetch_verified(&transport, &["https://a.test/go.tar.gz".to_string()], &dest)
            .await
            .unwrap();
    }
}
