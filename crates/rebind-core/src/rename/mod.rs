//! Safe renaming
//!
//! A [`RenameRequest`] names a set of symbols and one new spelling. The
//! [`Checker`] decides whether the rename is safe across every registered
//! package and reports all conflicts; [`apply`] then rewrites every
//! occurrence. A request with any conflict is rejected as a whole.

mod check;
mod methodsets;
mod mutate;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::resolve::ResolveError;
use crate::semantic::{Position, SymbolId};

pub use check::Checker;
pub use methodsets::{MethodSet, MethodSetCache};
pub use mutate::{Edit, TouchedUnits, apply};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRequest {
    pub targets: Vec<SymbolId>,
    pub new_name: String,
}

impl RenameRequest {
    pub fn new(targets: Vec<SymbolId>, new_name: impl Into<String>) -> Self {
        Self {
            targets,
            new_name: new_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The new name is already declared where the symbol is declared.
    ScopeCollision,
    /// A reference would resolve to a different declaration.
    Shadowing,
    /// A field or method of the same type already has the new name.
    SelectorCollision,
    /// An interface satisfaction relation would change.
    InterfaceBreak,
    /// An exported symbol referenced from other packages would become
    /// unexported.
    Visibility,
    /// The rename reaches a package the checker was not given.
    UnregisteredPackage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    #[serde(skip)]
    pub target: SymbolId,
    #[serde(skip)]
    pub other: Option<SymbolId>,
    pub position: Option<Position>,
    pub other_position: Option<Position>,
    pub message: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.position {
            Some(position) => write!(f, "{position}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
    /// Symbols beyond the request's targets that must be renamed with them.
    pub widened: Vec<SymbolId>,
    pub notes: Vec<String>,
    /// A target method takes part in interface satisfaction.
    pub method_scope: bool,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    pub fn touches_unregistered(&self) -> bool {
        self.conflicts
            .iter()
            .any(|c| c.kind == ConflictKind::UnregisteredPackage)
    }

    /// Targets followed by widened symbols.
    pub fn edit_set(&self, request: &RenameRequest) -> Vec<SymbolId> {
        let mut symbols = request.targets.clone();
        for &symbol in &self.widened {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        symbols
    }

    pub fn render(&self) -> String {
        self.conflicts.iter().map(|c| format!("{c}\n")).collect()
    }
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("renaming \"{name}\" to \"{to}\": conflicts detected\n{}", .report.render())]
    ConflictDetected {
        name: String,
        to: String,
        report: ConflictReport,
    },
    #[error("renaming to \"{to}\" would affect unanalyzed packages: {}", .packages.join(", "))]
    UnregisteredPackageTouched {
        to: String,
        packages: Vec<String>,
        report: ConflictReport,
    },
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl RenameError {
    pub fn report(&self) -> Option<&ConflictReport> {
        match self {
            RenameError::ConflictDetected { report, .. }
            | RenameError::UnregisteredPackageTouched { report, .. } => Some(report),
            RenameError::Resolve(_) => None,
        }
    }

    /// The snapshot was too narrow; reload with more packages and retry.
    pub fn needs_wider_snapshot(&self) -> bool {
        matches!(self, RenameError::UnregisteredPackageTouched { .. })
    }
}
