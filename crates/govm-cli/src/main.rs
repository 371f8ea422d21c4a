//! govm: install and manage Go toolchain versions.

mod cli;
mod commands;
mod tracing;

use crate::cli::{parse, Commands};
use govm_core::{Config, Error};

#[tokio::main]
async fn main() {
    let cli = parse();
    crate::tracing::init(cli.level);

    if let Err(code) = run(cli.command).await {
        std::process::exit(code);
    }
}

async fn run(command: Commands) -> Result<(), i32> {
    let mut config = Config::from_env().map_err(report)?;

    match command {
        Commands::Install {
            spec,
            prefix,
            force,
        } => {
            if let Some(prefix) = prefix {
                config.version_prefix = prefix;
            }
            if force {
                config.force_reinstall = true;
            }
            commands::install(&config, &spec).await.map_err(report)
        }
        // A specifier nothing matches is a distinct status for pure resolve
        // queries, so callers can tell "unknown" from "broken".
        Commands::Resolve { spec } => commands::resolve(&config, &spec).await.map_err(|error| {
            let code = if error.is_unrecognized() { 2 } else { 1 };
            eprintln!("{:?}", miette::Report::new(error));
            code
        }),
        Commands::List => commands::list(&config).map_err(report),
        Commands::Known { refresh } => {
            if refresh {
                config.force_refresh = true;
            }
            commands::known(&config).await.map_err(report)
        }
        Commands::Env { spec } => commands::env(&config, &spec).await.map_err(report),
    }
}

fn report(error: Error) -> i32 {
    eprintln!("{:?}", miette::Report::new(error));
    1
}
