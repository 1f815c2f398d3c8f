use serde::Serialize;
use tracing::{debug, info, instrument};

use super::collect::{ExportRecord, collect_exports};
use super::filter::NameFilter;
use super::usage::unused_exports;
use crate::semantic::{PackageId, Position, Program};

/// One unused export, as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedExport {
    pub package: String,
    pub name: String,
    pub kind: &'static str,
    pub position: Position,
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Number of exported declarations examined.
    pub exported: usize,
    pub entries: Vec<UnusedExport>,
    pub records: Vec<ExportRecord>,
}

impl ExportReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One `<position>: unused export <name>` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: unused export {}\n", e.position, e.name))
            .collect()
    }
}

pub struct ExportAnalyzer<'p> {
    program: &'p Program,
    filter: NameFilter,
    skip_tests: bool,
}

impl<'p> ExportAnalyzer<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            filter: NameFilter::new(),
            skip_tests: true,
        }
    }

    pub fn with_filter(mut self, filter: NameFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn skip_tests(mut self, skip: bool) -> Self {
        self.skip_tests = skip;
        self
    }

    /// Unused exports of `packages`, ordered by package path, then file,
    /// then declaration.
    #[instrument(skip_all, fields(packages = packages.len()))]
    pub fn analyze(&self, packages: &[PackageId]) -> ExportReport {
        let program = self.program;
        let mut ordered = packages.to_vec();
        ordered.sort_by(|&a, &b| program.package(a).path.cmp(&program.package(b).path));
        ordered.dedup();

        let mut report = ExportReport::default();
        for package in ordered {
            let units = program.units_of(&[package]);
            let records = collect_exports(program, &units, &self.filter, self.skip_tests);
            report.exported += records.len();
            debug!(
                package = %program.package(package).path,
                exported = records.len(),
                "collected exports"
            );

            for record in unused_exports(program, package, records) {
                report.entries.push(self.entry(package, &record));
                report.records.push(record);
            }
        }

        info!(
            exported = report.exported,
            unused = report.records.len(),
            "export analysis finished"
        );
        report
    }

    fn entry(&self, package: PackageId, record: &ExportRecord) -> UnusedExport {
        let kind = record
            .symbols
            .first()
            .map(|&s| self.program.symbol(s).kind.describe())
            .unwrap_or("object");
        UnusedExport {
            package: self.program.package(package).path.clone(),
            name: record.name.clone(),
            kind,
            position: self.program.position(record.ident),
        }
    }
}
