use govm_catalog::CatalogCache;
use govm_core::{Config, Result};
use govm_fetch::HttpTransport;

/// Print every version the published catalog knows about, sorted ascending.
pub async fn run(config: &Config) -> Result<()> {
    let transport = HttpTransport::new();
    let snapshot = CatalogCache::new(config).get(&transport).await?;
    for version in &snapshot.versions {
        println!("{version}");
    }
    Ok(())
}
