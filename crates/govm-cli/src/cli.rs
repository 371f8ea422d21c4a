use crate::tracing::LogLevel;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "govm")]
#[command(about = "Install and manage Go toolchain versions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Install the toolchain matching a version specifier")]
    Install {
        /// Version specifier: "1.21.5", "1.21.x", "stable", "oldstable",
        /// "tip", or any git ref of the Go repository
        spec: String,
        /// Install root for this invocation, overriding GOVM_VERSION_PREFIX
        prefix: Option<std::path::PathBuf>,
        #[arg(long, help = "Discard any existing install of this version first")]
        force: bool,
    },
    #[command(about = "Resolve a specifier to a concrete version without installing")]
    Resolve {
        /// Version specifier to resolve
        spec: String,
    },
    #[command(about = "List installed versions")]
    List,
    #[command(about = "List versions available in the published catalog")]
    Known {
        #[arg(long, help = "Refresh the catalog snapshot even inside the TTL window")]
        refresh: bool,
    },
    #[command(about = "Print the activation environment of an installed version")]
    Env {
        /// Version specifier of an installed toolchain
        spec: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
