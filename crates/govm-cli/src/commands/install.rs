use govm_catalog::Resolver;
use govm_core::{Config, Result, VersionSpec};
use govm_fetch::HttpTransport;
use govm_install::Installer;
use tracing::info;

/// Resolve `raw_spec` and drive the install strategy chain. On success the
/// descriptor is echoed to stdout so the caller can `eval` it.
pub async fn run(config: &Config, raw_spec: &str) -> Result<()> {
    let spec = VersionSpec::parse(raw_spec)?;
    let transport = HttpTransport::new();

    let resolved = Resolver::new(config).resolve(&transport, &spec).await?;
    info!(%spec, %resolved, "resolved");

    let outcome = Installer::new(config).install(&transport, &resolved).await?;
    eprintln!(
        "installed {} via {}",
        outcome.record.name, outcome.record.strategy
    );
    if !config.silent_env {
        print!("{}", outcome.env);
    }
    Ok(())
}
