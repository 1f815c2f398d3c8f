//! Dead-export analysis
//!
//! Exported declarations are collected from each package's syntax trees,
//! then tested against every importing package. An export is used when some
//! occurrence in an importer resolves to it, or, more weakly, to a symbol
//! with the same name from a package with the same path. Types that are
//! never named by an importer but appear in the signature of a used
//! function or the type of a used field are kept as used.

mod collect;
mod filter;
mod report;
mod usage;

pub use collect::{Enclosing, ExportRecord, collect_exports};
pub use filter::NameFilter;
pub use report::{ExportAnalyzer, ExportReport, UnusedExport};
pub use usage::{UseMatch, unused_exports, uses_export};
