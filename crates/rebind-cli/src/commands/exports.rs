//! Exports command - finds unused exports and unexports them

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rebind_core::{
    BatchMode, BatchResult, Config, ConflictPolicy, ExportReport, Outcome, Session,
    SessionOptions,
};
use tracing::info;

use super::SnapshotArgs;
use crate::naming::Initialisms;
use crate::output::{OutputFormat, json, text};

#[derive(Args, Debug)]
pub struct ExportsArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Only report unused exports; exit with 1 if there are any
    #[arg(short, long)]
    pub lint: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Only report names matching this regular expression (repeatable)
    #[arg(short, long, value_name = "REGEX")]
    pub include: Vec<String>,

    /// Never report names matching this regular expression (repeatable)
    #[arg(short, long, value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Additional initialisms, comma separated (e.g. GRPC,OAUTH)
    #[arg(long, value_name = "LIST")]
    pub initialisms: Option<String>,

    /// Skip renames that conflict instead of failing
    #[arg(short = 'c', long)]
    pub ignore_conflicts: bool,

    /// Rename implementing methods along with interface methods
    #[arg(long)]
    pub widen_methods: bool,

    /// Rename nothing unless every unexport succeeds
    #[arg(long)]
    pub all_or_nothing: bool,

    /// Report exports declared in test files too
    #[arg(long)]
    pub include_tests: bool,

    /// Configuration file (default: nearest rebind.toml above the snapshot)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ExportsArgs {
    pub fn run(&self) -> Result<Outcome> {
        self.snapshot.configure_colors();

        let config = self.merge(self.snapshot.load_config(self.config.as_deref())?);
        let options = SessionOptions::from_config(&config)?;
        let loaded = self.snapshot.load()?;
        let whole_program = loaded.initial.len() == loaded.program.packages().count();

        let mut session = Session::new(loaded.program, options);
        let report = session.unused_exports(&loaded.initial);
        info!(
            exported = report.exported,
            unused = report.entries.len(),
            "export analysis finished"
        );

        if self.lint || report.is_empty() {
            let outcome = if self.lint {
                Outcome::of_exports(&report)
            } else {
                Outcome::Clean
            };
            self.print(&report, None, outcome)?;
            return Ok(outcome);
        }

        if whole_program && session.requires_wider_snapshot(&report.records) {
            eprintln!(
                "{} the snapshot holds no importers beyond the analyzed packages; \
                 uses outside it are not checked",
                "warning:".yellow().bold()
            );
        }

        let initialisms = Initialisms::with_extra(&config.naming.initialisms);
        let result = session.unexport(&report, |name| initialisms.unexported_name(name));
        let outcome = match result.outcome() {
            Outcome::Findings if config.rename.conflicts == ConflictPolicy::Ignore => {
                Outcome::Clean
            }
            other => other,
        };

        self.print(&report, Some(&result), outcome)?;
        Ok(outcome)
    }

    /// Command-line flags take precedence over the config file.
    fn merge(&self, mut config: Config) -> Config {
        config.exports.include.extend(self.include.iter().cloned());
        config.exports.exclude.extend(self.exclude.iter().cloned());
        if self.include_tests {
            config.exports.skip_tests = false;
        }
        if let Some(list) = &self.initialisms {
            config
                .naming
                .initialisms
                .extend(Initialisms::parse_list(list));
        }
        if self.ignore_conflicts {
            config.rename.conflicts = ConflictPolicy::Ignore;
        }
        if self.widen_methods {
            config.rename.widen_methods = true;
        }
        if self.all_or_nothing {
            config.rename.batch = BatchMode::AllOrNothing;
        }
        config
    }

    fn print(
        &self,
        report: &ExportReport,
        batch: Option<&BatchResult>,
        outcome: Outcome,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", json::format_exports(report, batch, outcome)?),
            OutputFormat::Text => {
                print!("{}", text::format_exports(report));
                if let Some(batch) = batch {
                    println!();
                    print!("{}", text::format_batch(batch));
                }
            }
        }
        Ok(())
    }
}
