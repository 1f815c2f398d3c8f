//! rebind CLI - identifier renaming and dead-export analysis over a
//! loaded program snapshot.

mod commands;
mod logging;
mod naming;
mod output;

use std::process;

use clap::Parser;
use commands::Commands;
use rebind_core::Outcome;

use crate::logging::{LogArgs, init_logging};

#[derive(Parser, Debug)]
#[command(
    name = "rebind",
    author,
    version,
    about = "Safe cross-package renames and dead-export analysis",
    long_about = "rebind checks renames against every package of a loaded program before\n\
                  touching any occurrence, and finds exported declarations no importer uses.\n\n\
                  Exit status is 0 when clean and 1 on findings or rejected renames."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub log: LogArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let guard = init_logging(&cli.log);

    let outcome = match cli.command {
        Commands::Exports(args) => args.run(),
        Commands::Rename(args) => args.run(),
        Commands::Resolve(args) => args.run(),
    }?;

    if outcome != Outcome::Clean {
        drop(guard);
        process::exit(1);
    }

    Ok(())
}
