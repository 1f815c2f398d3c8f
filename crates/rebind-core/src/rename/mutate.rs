use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::ast::IdentId;
use crate::semantic::{PackageId, Program, SymbolId, UnitId};

/// One rewritten occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub filename: String,
    pub line: u32,
    pub column: u32,
    pub old: String,
    pub new: String,
}

/// Units whose occurrences changed, in filename order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TouchedUnits {
    #[serde(skip)]
    pub units: Vec<UnitId>,
    pub filenames: Vec<String>,
    pub edits: Vec<Edit>,
}

impl TouchedUnits {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn extend(&mut self, other: TouchedUnits) {
        for (unit, filename) in other.units.into_iter().zip(other.filenames) {
            if !self.units.contains(&unit) {
                self.units.push(unit);
                self.filenames.push(filename);
            }
        }
        self.edits.extend(other.edits);
    }
}

/// Rewrites every occurrence of `targets` inside `packages` to `new_name`
/// and renames the symbols themselves.
///
/// Callers are expected to have checked the rename first; nothing here
/// looks for conflicts.
#[instrument(skip_all, fields(to = %new_name, targets = targets.len()))]
pub fn apply(
    program: &mut Program,
    packages: &[PackageId],
    targets: &[SymbolId],
    new_name: &str,
) -> TouchedUnits {
    let wanted: HashSet<SymbolId> = targets.iter().copied().collect();
    let mut idents: Vec<IdentId> = Vec::new();

    for &package in packages {
        for &unit in &program.package(package).units {
            let unit = program.unit(unit);
            idents.extend(
                unit.defs
                    .iter()
                    .chain(unit.uses.iter())
                    .filter(|(_, symbol)| wanted.contains(*symbol))
                    .map(|(&ident, _)| ident),
            );
        }
    }

    // The header of a type switch is bound to no object but spells them all.
    for &target in targets {
        let symbol = program.symbol(target);
        if !symbol.implicit {
            continue;
        }
        if let Some(header) = symbol.decl {
            let package = program.unit(program.ident(header).unit).package;
            if packages.contains(&package) {
                idents.push(header);
            }
        }
    }

    idents.sort();
    idents.dedup();

    let mut touched = TouchedUnits::default();
    for ident in idents {
        let (unit, old, position) = {
            let occurrence = program.ident(ident);
            (occurrence.unit, occurrence.name.clone(), program.position(ident))
        };
        if old == new_name {
            continue;
        }
        program.ident_mut(ident).name = new_name.to_string();
        if !touched.units.contains(&unit) {
            touched.units.push(unit);
        }
        touched.edits.push(Edit {
            filename: position.filename,
            line: position.line,
            column: position.column,
            old,
            new: new_name.to_string(),
        });
    }

    for &target in targets {
        program.symbols_mut().rename(target, new_name);
    }

    touched
        .units
        .sort_by(|&a, &b| program.unit(a).filename.cmp(&program.unit(b).filename));
    touched.filenames = touched
        .units
        .iter()
        .map(|&u| program.unit(u).filename.clone())
        .collect();
    touched.edits.sort_by(|a, b| {
        (&a.filename, a.line, a.column).cmp(&(&b.filename, b.line, b.column))
    });

    debug!(
        units = touched.units.len(),
        edits = touched.edits.len(),
        "applied rename"
    );
    touched
}
