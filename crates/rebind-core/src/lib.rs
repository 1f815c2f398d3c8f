//! Identifier resolution, dead-export analysis and safe renaming over a
//! loaded semantic model of a Go program.
//!
//! The pipeline is load → analyze → mutate: a [`snapshot`] becomes a
//! [`Program`], [`exports`] finds exported declarations no importer uses,
//! and [`rename`] checks a rename across every registered package before
//! rewriting any occurrence. [`Session`] strings the stages together.

pub mod ast;
pub mod config;
pub mod exports;
pub mod rename;
pub mod resolve;
pub mod semantic;
pub mod session;
pub mod snapshot;

pub use config::{BatchMode, Config, ConfigError, ConflictPolicy};
pub use exports::{ExportAnalyzer, ExportRecord, ExportReport, NameFilter, UnusedExport};
pub use rename::{
    Checker, Conflict, ConflictKind, ConflictReport, RenameError, RenameRequest, TouchedUnits,
};
pub use resolve::{ResolveError, resolve, resolve_at};
pub use semantic::{PackageId, Position, Program, ProgramBuilder, SymbolId};
pub use session::{BatchResult, Outcome, Session, SessionOptions};
pub use snapshot::{LoadedProgram, Snapshot, SnapshotError, load_snapshot};
