//! Resolve command - shows what an occurrence refers to

use anyhow::Result;
use clap::Args;
use rebind_core::{Outcome, resolve_at};

use super::{LocationArgs, SnapshotArgs};
use crate::output::{OutputFormat, json, text};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ResolveArgs {
    pub fn run(&self) -> Result<Outcome> {
        self.snapshot.configure_colors();
        let loaded = self.snapshot.load()?;

        let LocationArgs { file, line, column } = &self.location;
        let symbols = resolve_at(&loaded.program, file, *line, *column)?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", json::format_resolved(&loaded.program, &symbols)?)
            }
            OutputFormat::Text => print!("{}", text::format_resolved(&loaded.program, &symbols)),
        }
        Ok(Outcome::Clean)
    }
}
