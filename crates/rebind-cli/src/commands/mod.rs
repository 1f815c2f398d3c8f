//! CLI command implementations

pub mod exports;
pub mod rename;
pub mod resolve;

pub use exports::ExportsArgs;
pub use rename::RenameArgs;
pub use resolve::ResolveArgs;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use rebind_core::config::{load_config_or_default_with_warnings, load_config_with_warnings};
use rebind_core::{Config, LoadedProgram, load_snapshot};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report exported declarations no importer uses, and unexport them
    Exports(ExportsArgs),

    /// Rename the declaration at a position everywhere it is used
    Rename(RenameArgs),

    /// Show the declarations an occurrence refers to
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Snapshot of the loaded program (JSON)
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl SnapshotArgs {
    pub fn configure_colors(&self) {
        let no_color_env = std::env::var("NO_COLOR").is_ok();
        if self.no_color || no_color_env {
            colored::control::set_override(false);
        }
    }

    pub fn load(&self) -> Result<LoadedProgram> {
        load_snapshot(&self.snapshot)
            .with_context(|| format!("Failed to load snapshot {}", self.snapshot.display()))
    }

    /// Directory searched upwards for `rebind.toml`.
    fn config_dir(&self) -> &Path {
        self.snapshot
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    /// Loads `explicit`, or the nearest `rebind.toml` above the snapshot,
    /// printing unknown-key warnings.
    pub fn load_config(&self, explicit: Option<&Path>) -> Result<Config> {
        let result = match explicit {
            Some(path) => load_config_with_warnings(path)?,
            None => load_config_or_default_with_warnings(self.config_dir()),
        };
        for warning in &result.warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
        Ok(result.config)
    }
}

/// Position of one occurrence.
#[derive(Args, Debug)]
pub struct LocationArgs {
    /// File containing the occurrence, as named in the snapshot
    #[arg(long, value_name = "FILE")]
    pub file: String,

    /// Line of the occurrence (1-based)
    #[arg(long)]
    pub line: u32,

    /// Column of the occurrence's first character (1-based)
    #[arg(long)]
    pub column: u32,
}
