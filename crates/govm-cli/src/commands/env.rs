use govm_catalog::Resolver;
use govm_core::{Config, Error, Result, VersionSpec};
use govm_fetch::HttpTransport;
use govm_install::RecordPaths;

/// Print the persisted activation environment of an installed version.
pub async fn run(config: &Config, raw_spec: &str) -> Result<()> {
    let spec = VersionSpec::parse(raw_spec)?;
    let transport = HttpTransport::new();
    let resolved = Resolver::new(config).resolve(&transport, &spec).await?;

    let paths = RecordPaths::for_resolved(config, &resolved);
    if !paths.exists() {
        return Err(Error::not_found(format!("{} is not installed", paths.name)));
    }
    let content = std::fs::read_to_string(&paths.descriptor)
        .map_err(|e| Error::io(e, "read env descriptor"))?;
    print!("{content}");
    Ok(())
}
