//! JSON output for programmatic integration.

use rebind_core::rename::{Conflict, Edit};
use rebind_core::session::AppliedRename;
use rebind_core::{BatchResult, ExportReport, Outcome, Position, Program, SymbolId, UnusedExport};
use serde::Serialize;

const FORMAT_VERSION: &str = "1";

#[derive(Serialize)]
pub struct ExportsOutput<'a> {
    pub version: &'static str,
    pub outcome: Outcome,
    pub exported: usize,
    pub unused: &'a [UnusedExport],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchOutput<'a>>,
}

#[derive(Serialize)]
pub struct BatchOutput<'a> {
    pub aborted: bool,
    pub applied: &'a [AppliedRename],
    pub rejected: Vec<JsonRejected<'a>>,
    pub files: &'a [String],
    pub edits: &'a [Edit],
}

#[derive(Serialize)]
pub struct JsonRejected<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub message: String,
    pub needs_wider_snapshot: bool,
    pub conflicts: &'a [Conflict],
}

#[derive(Serialize)]
pub struct RenameOutput<'a> {
    pub version: &'static str,
    pub outcome: Outcome,
    #[serde(flatten)]
    pub batch: BatchOutput<'a>,
}

#[derive(Serialize)]
pub struct JsonSymbol<'a> {
    pub name: &'a str,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl<'a> BatchOutput<'a> {
    pub fn new(result: &'a BatchResult) -> Self {
        let rejected = result
            .rejected
            .iter()
            .map(|r| JsonRejected {
                from: &r.from,
                to: &r.to,
                message: r.error.to_string(),
                needs_wider_snapshot: r.error.needs_wider_snapshot(),
                conflicts: r
                    .error
                    .report()
                    .map(|report| report.conflicts.as_slice())
                    .unwrap_or(&[]),
            })
            .collect();

        Self {
            aborted: result.aborted,
            applied: &result.applied,
            rejected,
            files: &result.touched.filenames,
            edits: &result.touched.edits,
        }
    }
}

pub fn format_exports(
    report: &ExportReport,
    batch: Option<&BatchResult>,
    outcome: Outcome,
) -> serde_json::Result<String> {
    let output = ExportsOutput {
        version: FORMAT_VERSION,
        outcome,
        exported: report.exported,
        unused: &report.entries,
        batch: batch.map(BatchOutput::new),
    };
    serde_json::to_string_pretty(&output)
}

pub fn format_rename(result: &BatchResult, outcome: Outcome) -> serde_json::Result<String> {
    let output = RenameOutput {
        version: FORMAT_VERSION,
        outcome,
        batch: BatchOutput::new(result),
    };
    serde_json::to_string_pretty(&output)
}

pub fn format_resolved(program: &Program, symbols: &[SymbolId]) -> serde_json::Result<String> {
    let symbols: Vec<JsonSymbol<'_>> = symbols
        .iter()
        .map(|&id| {
            let symbol = program.symbol(id);
            JsonSymbol {
                name: &symbol.name,
                kind: symbol.kind.describe(),
                package: symbol.package.map(|p| program.package(p).path.as_str()),
                position: program.symbol_position(id),
            }
        })
        .collect();
    serde_json::to_string_pretty(&symbols)
}
