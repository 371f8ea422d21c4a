//! Environment descriptors: the persisted activation metadata for an
//! installed toolchain.
//!
//! A descriptor is an ordered list of directives rendered to a
//! POSIX-sourceable file. Host-matching installs get `unset` directives for
//! `GOOS`/`GOARCH` so the toolchain behaves host-native and sourcing the
//! file neutralizes any earlier cross-compile environment; cross installs
//! get explicit overrides.

use govm_core::{Config, Error, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// One activation directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "directive", rename_all = "lowercase")]
pub enum EnvDirective {
    /// Export a variable.
    Set { name: String, value: String },
    /// Remove a variable from the environment.
    Unset { name: String },
    /// Prepend a directory to PATH.
    PathPrepend { dir: String },
}

/// Activation metadata for one installed toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvDescriptor {
    pub directives: Vec<EnvDirective>,
}

impl EnvDescriptor {
    /// Build the descriptor for an install rooted at `goroot`.
    ///
    /// `goroot` must already be absolute; install roots are derived from
    /// the configured version prefix, which is.
    #[must_use]
    pub fn describe(config: &Config, goroot: &Path) -> Self {
        let mut directives = Vec::new();

        if config.target_is_host() {
            directives.push(EnvDirective::Unset {
                name: "GOOS".to_string(),
            });
            directives.push(EnvDirective::Unset {
                name: "GOARCH".to_string(),
            });
        } else {
            directives.push(EnvDirective::Set {
                name: "GOOS".to_string(),
                value: config.target.os.name().to_string(),
            });
            directives.push(EnvDirective::Set {
                name: "GOARCH".to_string(),
                value: config.target.arch.name().to_string(),
            });
        }

        directives.push(EnvDirective::Set {
            name: "GOROOT".to_string(),
            value: goroot.display().to_string(),
        });
        directives.push(EnvDirective::PathPrepend {
            dir: goroot.join("bin").display().to_string(),
        });

        if let Some(cgo) = config.cgo_enabled {
            directives.push(EnvDirective::Set {
                name: "CGO_ENABLED".to_string(),
                value: if cgo { "1" } else { "0" }.to_string(),
            });
        }
        if let Some(ref cc) = config.cc {
            directives.push(EnvDirective::Set {
                name: "CC".to_string(),
                value: cc.clone(),
            });
        }

        Self { directives }
    }

    /// Render to shell text, one directive per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            match directive {
                EnvDirective::Set { name, value } => {
                    out.push_str(&format!("export {name}='{value}'\n"));
                }
                EnvDirective::Unset { name } => {
                    out.push_str(&format!("unset {name}\n"));
                }
                EnvDirective::PathPrepend { dir } => {
                    out.push_str(&format!("export PATH=\"{dir}:${{PATH}}\"\n"));
                }
            }
        }
        out
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(e, "create env directory"))?;
        }
        std::fs::write(path, self.render()).map_err(|e| Error::io(e, "write env descriptor"))?;
        debug!(path = %path.display(), "descriptor written");
        Ok(())
    }

    /// Publish or refresh the stable `latest` alias next to `descriptor`.
    /// Only host-native installs are aliased, and only when aliasing is not
    /// suppressed.
    pub fn write_alias(&self, config: &Config) -> Result<()> {
        if config.no_alias || !config.target_is_host() {
            return Ok(());
        }
        self.write(&config.env_prefix.join("latest"))
    }
}
