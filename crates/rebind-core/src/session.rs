//! Batch pipeline: analyze, check, then mutate.
//!
//! A [`Session`] owns the loaded program for the duration of one run. Each
//! rename request is checked against the registered packages before any
//! occurrence is rewritten, and a rejected request never leaves a partial
//! edit behind.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::{BatchMode, Config, ConfigError, ConflictPolicy};
use crate::exports::{ExportAnalyzer, ExportRecord, ExportReport, NameFilter};
use crate::rename::{
    Checker, ConflictKind, ConflictReport, RenameError, RenameRequest, TouchedUnits, apply,
};
use crate::semantic::{PackageId, Program, SymbolId};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub widen_methods: bool,
    pub conflicts: ConflictPolicy,
    pub batch: BatchMode,
    pub skip_tests: bool,
    pub filter: NameFilter,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            widen_methods: false,
            conflicts: ConflictPolicy::default(),
            batch: BatchMode::default(),
            skip_tests: true,
            filter: NameFilter::new(),
        }
    }
}

impl SessionOptions {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            widen_methods: config.rename.widen_methods,
            conflicts: config.rename.conflicts,
            batch: config.rename.batch,
            skip_tests: config.exports.skip_tests,
            filter: config.exports.name_filter()?,
        })
    }
}

/// Overall result of a run, for exit-code mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Clean,
    Findings,
    Failed,
}

impl Outcome {
    pub fn of_exports(report: &ExportReport) -> Self {
        if report.is_empty() {
            Outcome::Clean
        } else {
            Outcome::Findings
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppliedRename {
    pub from: String,
    pub to: String,
    #[serde(skip)]
    pub symbols: Vec<SymbolId>,
    pub notes: Vec<String>,
}

#[derive(Debug)]
pub struct RejectedRename {
    pub from: String,
    pub to: String,
    pub error: RenameError,
}

#[derive(Debug, Default)]
pub struct BatchResult {
    pub applied: Vec<AppliedRename>,
    pub rejected: Vec<RejectedRename>,
    pub touched: TouchedUnits,
    /// A rejection stopped the batch; nothing should be written.
    pub aborted: bool,
}

impl BatchResult {
    pub fn outcome(&self) -> Outcome {
        if self.aborted {
            Outcome::Failed
        } else if self.rejected.is_empty() {
            Outcome::Clean
        } else {
            Outcome::Findings
        }
    }
}

pub struct Session {
    program: Program,
    options: SessionOptions,
    registered: Vec<PackageId>,
}

impl Session {
    /// A session in which every loaded package may be rewritten.
    pub fn new(program: Program, options: SessionOptions) -> Self {
        let registered = program.packages().map(|p| p.id).collect();
        Self::with_packages(program, options, registered)
    }

    /// A session that may only rewrite `registered`.
    pub fn with_packages(
        program: Program,
        options: SessionOptions,
        mut registered: Vec<PackageId>,
    ) -> Self {
        registered.sort_by(|&a, &b| program.package(a).path.cmp(&program.package(b).path));
        registered.dedup();
        Self {
            program,
            options,
            registered,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn into_program(self) -> Program {
        self.program
    }

    pub fn registered(&self) -> &[PackageId] {
        &self.registered
    }

    pub fn unused_exports(&self, packages: &[PackageId]) -> ExportReport {
        ExportAnalyzer::new(&self.program)
            .with_filter(self.options.filter.clone())
            .skip_tests(self.options.skip_tests)
            .analyze(packages)
    }

    /// Whether renaming `records` could reach packages outside the loaded
    /// program: exported symbols may be used by importers that were never
    /// loaded.
    pub fn requires_wider_snapshot(&self, records: &[ExportRecord]) -> bool {
        records.iter().any(|record| {
            record
                .symbols
                .iter()
                .any(|&s| self.program.symbol(s).is_exported())
        })
    }

    /// Renames every unused export in `report` to the spelling `name_fn`
    /// chooses for it.
    pub fn unexport(
        &mut self,
        report: &ExportReport,
        name_fn: impl Fn(&str) -> String,
    ) -> BatchResult {
        let requests = report
            .records
            .iter()
            .map(|record| RenameRequest::new(record.symbols.clone(), name_fn(&record.name)))
            .collect();
        self.rename(requests)
    }

    #[instrument(skip_all, fields(requests = requests.len(), batch = ?self.options.batch))]
    pub fn rename(&mut self, requests: Vec<RenameRequest>) -> BatchResult {
        match self.options.batch {
            BatchMode::PerRequest => {
                run_batch(&mut self.program, &self.registered, &self.options, requests)
            }
            BatchMode::AllOrNothing => {
                let mut scratch = self.program.clone();
                let mut result = run_batch(&mut scratch, &self.registered, &self.options, requests);
                if result.rejected.is_empty() {
                    self.program = scratch;
                } else {
                    warn!(
                        rejected = result.rejected.len(),
                        "batch rejected; program left unchanged"
                    );
                    result.applied.clear();
                    result.touched = TouchedUnits::default();
                    result.aborted = true;
                }
                result
            }
        }
    }
}

fn run_batch(
    program: &mut Program,
    registered: &[PackageId],
    options: &SessionOptions,
    requests: Vec<RenameRequest>,
) -> BatchResult {
    let mut result = BatchResult::default();
    let mut widened: HashSet<SymbolId> = HashSet::new();

    for request in requests {
        // Symbols pulled in by an earlier widening are already renamed.
        // Anything else, a repeated request included, goes to the checker.
        if !request.targets.is_empty()
            && request.targets.iter().all(|s| {
                widened.contains(s) && program.symbol(*s).name == request.new_name
            })
        {
            info!(to = %request.new_name, "covered by an earlier widening");
            continue;
        }

        let from = request
            .targets
            .first()
            .map(|&s| program.symbol(s).name.clone())
            .unwrap_or_default();

        match check(program, registered, options, &request, &from) {
            Ok(report) => {
                let symbols = report.edit_set(&request);
                let touched = apply(program, registered, &symbols, &request.new_name);
                info!(
                    from = %from,
                    to = %request.new_name,
                    edits = touched.edits.len(),
                    "renamed"
                );
                result.touched.extend(touched);
                widened.extend(report.widened.iter().copied());
                result.applied.push(AppliedRename {
                    from,
                    to: request.new_name,
                    symbols,
                    notes: report.notes,
                });
            }
            Err(error) => {
                warn!(from = %from, to = %request.new_name, "{error}");
                result.rejected.push(RejectedRename {
                    from,
                    to: request.new_name,
                    error,
                });
                if options.conflicts == ConflictPolicy::Abort
                    && options.batch == BatchMode::PerRequest
                {
                    result.aborted = true;
                    break;
                }
            }
        }
    }

    sort_touched(program, &mut result.touched);
    result
}

fn check(
    program: &Program,
    registered: &[PackageId],
    options: &SessionOptions,
    request: &RenameRequest,
    from: &str,
) -> Result<ConflictReport, RenameError> {
    let mut checker = Checker::new(program).widen_methods(options.widen_methods);
    for &package in registered {
        checker.register_package(package);
    }

    let report = checker.check(request);
    if report.touches_unregistered() {
        let packages = unregistered_packages(program, &checker, &report);
        return Err(RenameError::UnregisteredPackageTouched {
            to: request.new_name.clone(),
            packages,
            report,
        });
    }
    if report.has_conflicts() {
        return Err(RenameError::ConflictDetected {
            name: from.to_string(),
            to: request.new_name.clone(),
            report,
        });
    }
    Ok(report)
}

fn unregistered_packages(
    program: &Program,
    checker: &Checker<'_>,
    report: &ConflictReport,
) -> Vec<String> {
    let mut paths: Vec<String> = report
        .conflicts
        .iter()
        .filter(|c| c.kind == ConflictKind::UnregisteredPackage)
        .flat_map(|c| std::iter::once(c.target).chain(c.other))
        .flat_map(|symbol| {
            let occurrences = program.occurrences(symbol);
            program
                .symbol(symbol)
                .package
                .into_iter()
                .chain(
                    occurrences
                        .into_iter()
                        .map(|i| program.unit(program.ident(i).unit).package),
                )
                .collect::<Vec<_>>()
        })
        .filter(|&package| !checker.is_registered(package))
        .map(|package| program.package(package).path.clone())
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

fn sort_touched(program: &Program, touched: &mut TouchedUnits) {
    touched
        .units
        .sort_by(|&a, &b| program.unit(a).filename.cmp(&program.unit(b).filename));
    touched.filenames = touched
        .units
        .iter()
        .map(|&u| program.unit(u).filename.clone())
        .collect();
    touched
        .edits
        .sort_by(|a, b| (&a.filename, a.line, a.column).cmp(&(&b.filename, b.line, b.column)));
}
