//! Tarball unpacking for release artifacts.
//!
//! Go distribution tarballs (binary and source alike) contain a single
//! top-level `go/` directory. Extraction goes to a hidden temp sibling of
//! the final root and is renamed into place, so an interrupted unpack never
//! leaves a half-populated install directory under the real name.

use flate2::read::GzDecoder;
use govm_core::{Error, Result};
use std::path::Path;
use tar::Archive;
use tracing::debug;

/// Unpack the tar.gz at `tarball` so that its inner `go/` tree becomes
/// `goroot`. An existing `goroot` (e.g. a partial tree from a killed run)
/// is replaced.
pub fn unpack_distribution(tarball: &Path, goroot: &Path) -> Result<()> {
    let name = goroot
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("goroot");
    let staging = goroot.with_file_name(format!(".{name}.unpack"));

    if staging.exists() {
        std::fs::remove_dir_all(&staging).map_err(|e| Error::io(e, "clear unpack staging"))?;
    }
    std::fs::create_dir_all(&staging).map_err(|e| Error::io(e, "create unpack staging"))?;

    let result = unpack_into(tarball, &staging);
    if let Err(e) = result {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(e);
    }

    let inner = staging.join("go");
    if !inner.is_dir() {
        let _ = std::fs::remove_dir_all(&staging);
        return Err(Error::build(
            goroot.display().to_string(),
            format!("archive {} has no top-level go/ directory", tarball.display()),
        ));
    }

    if goroot.exists() {
        std::fs::remove_dir_all(goroot).map_err(|e| Error::io(e, "replace install directory"))?;
    }
    std::fs::rename(&inner, goroot).map_err(|e| Error::io(e, "move unpacked tree into place"))?;
    let _ = std::fs::remove_dir_all(&staging);

    debug!(goroot = %goroot.display(), "distribution unpacked");
    Ok(())
}

fn unpack_into(tarball: &Path, dest: &Path) -> Result<()> {
    let file = std::fs::File::open(tarball).map_err(|e| Error::io(e, "open tarball"))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive
        .unpack(dest)
        .map_err(|e| Error::io(e, "unpack tarball"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::write_fake_distribution;

    #[test]
    fn unpacks_inner_go_tree_to_goroot() {
        let tmp = tempfile::tempdir().unwrap();
        let tarball = tmp.path().join("go1.21.5.tar.gz");
        write_fake_distribution(&tarball, "1.21.5");

        let goroot = tmp.path().join("versions/go1.21.5.linux.amd64");
        std::fs::create_dir_all(goroot.parent().unwrap()).unwrap();
        unpack_distribution(&tarball, &goroot).unwrap();

        assert!(goroot.join("bin/go").exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(goroot.join("bin/go"))
                .unwrap()
                .permissions()
                .mode();
            assert_ne!(mode & 0o111, 0, "go binary must stay executable");
        }
    }

    #[test]
    fn replaces_partial_existing_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let tarball = tmp.path().join("go.tar.gz");
        write_fake_distribution(&tarball, "1.21.5");

        let goroot = tmp.path().join("go1.21.5.linux.amd64");
        std::fs::create_dir_all(goroot.join("bin")).unwrap();
        std::fs::write(goroot.join("bin/leftover"), "junk").unwrap();

        unpack_distribution(&tarball, &goroot).unwrap();
        assert!(goroot.join("bin/go").exists());
        assert!(!goroot.join("bin/leftover").exists());
    }

    #[test]
    fn archive_without_go_dir_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let tarball = tmp.path().join("bad.tar.gz");
        // A tarball with content under the wrong top-level name.
        let file = std::fs::File::create(&tarball).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
        let mut builder = tar::Builder::new(encoder);
        let data = b"not a distribution";
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "other/file", &data[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let goroot = tmp.path().join("goroot");
        assert!(unpack_distribution(&tarball, &goroot).is_err());
        assert!(!goroot.exists());
    }
}
