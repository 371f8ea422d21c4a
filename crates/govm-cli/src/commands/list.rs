use govm_core::{Config, Result};

/// Print installed record names, one per line.
pub fn run(config: &Config) -> Result<()> {
    for name in govm_install::list_installed(config)? {
        println!("{name}");
    }
    Ok(())
}
