//! Installation records: where a resolved version lives on disk.
//!
//! Install directories are named deterministically by (version, os, arch),
//! or are the single shared git working tree. There is no lock file and no
//! registry: the descriptor file's presence *is* the record. Two
//! invocations racing on the same key converge on the same end state; the
//! last writer's descriptor wins and both describe a valid install.

use govm_core::{Config, Error, ResolvedVersion, Result};
use std::path::PathBuf;
use tracing::info;

/// Deterministic on-disk locations for one installable key.
#[derive(Debug, Clone)]
pub struct RecordPaths {
    /// Record name, e.g. `go1.21.5.linux.amd64` or `gotip`.
    pub name: String,
    /// The toolchain root (GOROOT) for this install.
    pub goroot: PathBuf,
    /// The descriptor file; its presence means the record exists.
    pub descriptor: PathBuf,
}

impl RecordPaths {
    /// Compute the locations for `resolved` under the configured roots.
    #[must_use]
    pub fn for_resolved(config: &Config, resolved: &ResolvedVersion) -> Self {
        match resolved {
            ResolvedVersion::Release(version) => {
                let name = format!("go{version}.{}.{}", config.target.os, config.target.arch);
                Self {
                    goroot: config.version_prefix.join(&name),
                    descriptor: config.env_prefix.join(format!("{name}.env")),
                    name,
                }
            }
            // All source-control installs share the working clone and a
            // single descriptor.
            ResolvedVersion::Commit { .. } => Self::git(config),
        }
    }

    /// The singleton record for installs built out of the working clone.
    #[must_use]
    pub fn git(config: &Config) -> Self {
        Self {
            name: "gotip".to_string(),
            goroot: config.git_clone_dir(),
            descriptor: config.env_prefix.join("gotip.env"),
        }
    }

    /// Whether a record exists. Descriptor presence is the sole source of
    /// truth; a dangling install directory without a descriptor is not a
    /// record.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.descriptor.exists()
    }

    /// Remove the record for a forced reinstall: descriptor first, so a
    /// crash mid-removal leaves "record absent" rather than a record
    /// pointing at a half-deleted tree.
    pub fn remove(&self) -> Result<()> {
        info!(record = %self.name, "removing record for reinstall");
        if self.descriptor.exists() {
            std::fs::remove_file(&self.descriptor)
                .map_err(|e| Error::io(e, "remove env descriptor"))?;
        }
        if self.goroot.exists() {
            std::fs::remove_dir_all(&self.goroot)
                .map_err(|e| Error::io(e, "remove install directory"))?;
        }
        Ok(())
    }
}

/// Names of all installed records, version-file order, `latest` excluded.
pub fn list_installed(config: &Config) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries = match std::fs::read_dir(&config.env_prefix) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(Error::io(e, "read env directory")),
    };
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(e, "read env directory entry"))?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(record) = name.strip_suffix(".env") {
            names.push(record.to_string());
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use govm_core::GoVersion;

    fn release(s: &str) -> ResolvedVersion {
        ResolvedVersion::Release(GoVersion::parse(s).unwrap())
    }

    #[test]
    fn release_paths_are_keyed_by_version_and_platform() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        let paths = RecordPaths::for_resolved(&cfg, &release("1.21.5"));

        let expected = format!("go1.21.5.{}.{}", cfg.target.os, cfg.target.arch);
        assert_eq!(paths.name, expected);
        assert_eq!(paths.goroot, cfg.version_prefix.join(&expected));
        assert_eq!(paths.descriptor, cfg.env_prefix.join(format!("{expected}.env")));
    }

    #[test]
    fn commit_paths_are_the_shared_clone() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        let paths = RecordPaths::for_resolved(
            &cfg,
            &ResolvedVersion::Commit {
                short_sha: "a1b2c3d4e5f6".to_string(),
                spec: "tip".to_string(),
            },
        );
        assert_eq!(paths.name, "gotip");
        assert_eq!(paths.goroot, cfg.git_clone_dir());
    }

    #[test]
    fn descriptor_presence_is_the_record() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        let paths = RecordPaths::for_resolved(&cfg, &release("1.21.5"));

        assert!(!paths.exists());
        // A dangling install directory alone is not a record.
        std::fs::create_dir_all(&paths.goroot).unwrap();
        assert!(!paths.exists());

        std::fs::create_dir_all(paths.descriptor.parent().unwrap()).unwrap();
        std::fs::write(&paths.descriptor, "export GOROOT='x'\n").unwrap();
        assert!(paths.exists());
    }

    #[test]
    fn remove_deletes_descriptor_then_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        let paths = RecordPaths::for_resolved(&cfg, &release("1.21.5"));
        std::fs::create_dir_all(&paths.goroot).unwrap();
        std::fs::create_dir_all(paths.descriptor.parent().unwrap()).unwrap();
        std::fs::write(&paths.descriptor, "x").unwrap();

        paths.remove().unwrap();
        assert!(!paths.descriptor.exists());
        assert!(!paths.goroot.exists());
    }

    #[test]
    fn list_installed_strips_env_suffix_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        std::fs::create_dir_all(&cfg.env_prefix).unwrap();
        for name in ["go1.21.5.linux.amd64.env", "go1.9.linux.amd64.env", "latest"] {
            std::fs::write(cfg.env_prefix.join(name), "x").unwrap();
        }

        let names = list_installed(&cfg).unwrap();
        assert_eq!(names, vec!["go1.21.5.linux.amd64", "go1.9.linux.amd64"]);
    }

    #[test]
    fn list_installed_on_missing_dir_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = Config::for_root(tmp.path());
        assert!(list_installed(&cfg).unwrap().is_empty());
    }
}
