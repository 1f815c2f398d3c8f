//! Rename command - renames one declaration and every reference to it

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rebind_core::{Outcome, RenameRequest, Session, SessionOptions, resolve_at};

use super::{LocationArgs, SnapshotArgs};
use crate::naming::is_valid_identifier;
use crate::output::{OutputFormat, json, text};

#[derive(Args, Debug)]
pub struct RenameArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    #[command(flatten)]
    pub location: LocationArgs,

    /// New name
    #[arg(long, value_name = "NAME")]
    pub to: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Rename implementing methods along with interface methods
    #[arg(long)]
    pub widen_methods: bool,

    /// Configuration file (default: nearest rebind.toml above the snapshot)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl RenameArgs {
    pub fn run(&self) -> Result<Outcome> {
        self.snapshot.configure_colors();
        if !is_valid_identifier(&self.to) {
            anyhow::bail!("'{}' is not a valid identifier", self.to);
        }

        let mut config = self.snapshot.load_config(self.config.as_deref())?;
        if self.widen_methods {
            config.rename.widen_methods = true;
        }
        let options = SessionOptions::from_config(&config)?;
        let loaded = self.snapshot.load()?;

        let LocationArgs { file, line, column } = &self.location;
        let targets = resolve_at(&loaded.program, file, *line, *column)?;

        let mut session = Session::new(loaded.program, options);
        let result = session.rename(vec![RenameRequest::new(targets, self.to.clone())]);
        let outcome = result.outcome();

        match self.format {
            OutputFormat::Json => println!("{}", json::format_rename(&result, outcome)?),
            OutputFormat::Text => print!("{}", text::format_batch(&result)),
        }
        Ok(outcome)
    }
}
