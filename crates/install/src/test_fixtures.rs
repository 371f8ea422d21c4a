//! Shared fixtures for install tests: synthetic distribution tarballs whose
//! `go` binary is a small script reporting a fixed version.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::Path;

/// Write a fake binary distribution: `go/bin/go` (executable, reports
/// `go<version>`) and `go/VERSION`.
pub fn write_fake_distribution(path: &Path, version: &str) {
    let go_script = format!("#!/bin/sh\necho \"go version go{version} linux/amd64\"\n");
    write_tarball(
        path,
        &[
            ("go/VERSION", format!("go{version}\n"), 0o644),
            ("go/bin/go", go_script, 0o755),
        ],
    );
}

/// Write a fake cross-platform binary distribution: `go/bin/go` carries
/// foreign-architecture machine code that cannot execute on this host.
pub fn write_fake_foreign_distribution(path: &Path, version: &str) {
    let machine_code = "\u{7f}ELF\u{2}\u{1}\u{1}\u{0}not-host-code".to_string();
    write_tarball(
        path,
        &[
            ("go/VERSION", format!("go{version}\n"), 0o644),
            ("go/bin/go", machine_code, 0o755),
        ],
    );
}

/// Write a fake source distribution: `go/src/make.bash` that "builds"
/// `go/bin/go` as the same reporting script.
pub fn write_fake_source_distribution(path: &Path, version: &str) {
    let make_bash = format!(
        "#!/bin/sh\n\
         set -e\n\
         bin=\"$(dirname \"$0\")/../bin\"\n\
         mkdir -p \"$bin\"\n\
         printf '#!/bin/sh\\necho \"go version go{version} linux/amd64\"\\n' > \"$bin/go\"\n\
         chmod +x \"$bin/go\"\n"
    );
    write_tarball(
        path,
        &[
            ("go/VERSION", format!("go{version}\n"), 0o644),
            ("go/src/make.bash", make_bash, 0o755),
        ],
    );
}

fn write_tarball(path: &Path, entries: &[(&str, String, u32)]) {
    #[allow(clippy::unwrap_used)]
    let file = std::fs::File::create(path).unwrap();
    let encoder = GzEncoder::new(file, Compression::fast());
    let mut builder = tar::Builder::new(encoder);
    for (name, content, mode) in entries {
        let data = content.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        #[allow(clippy::unwrap_used)]
        builder.append_data(&mut header, name, data).unwrap();
    }
    #[allow(clippy::unwrap_used)]
    builder.into_inner().unwrap().finish().unwrap();
}
