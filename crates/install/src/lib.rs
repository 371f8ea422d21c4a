//! Installation for govm: strategy orchestration, on-disk records, and
//! environment descriptor generation.

mod archive;
mod env;
mod installer;
mod record;
mod strategy;
pub mod test_fixtures;

pub use env::{EnvDescriptor, EnvDirective};
pub use installer::{InstallOutcome, InstallRecord, Installer};
pub use record::{list_installed, RecordPaths};
pub use strategy::{chain, Strategy};
