use govm_catalog::Resolver;
use govm_core::{Config, Result, VersionSpec};
use govm_fetch::HttpTransport;

/// Print the concrete version or commit a specifier resolves to.
pub async fn run(config: &Config, raw_spec: &str) -> Result<()> {
    let spec = VersionSpec::parse(raw_spec)?;
    let transport = HttpTransport::new();
    let resolved = Resolver::new(config).resolve(&transport, &spec).await?;
    println!("{resolved}");
    Ok(())
}
