//! Identifier resolution
//!
//! Maps one identifier occurrence to the objects it denotes. Bound
//! occurrences resolve through the unit's use and definition maps. Two
//! unbound forms are recognised from the enclosing syntax: the package
//! clause, which cannot be renamed, and the header of a type switch, whose
//! objects are declared implicitly per clause.

use thiserror::Error;
use tracing::debug;

use crate::ast::{IdentId, Node, Pos, Stmt, path_to};
use crate::semantic::{Position, Program, SymbolId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("{position}: renaming \"{name}\" is not supported: package clause")]
    UnsupportedRename { name: String, position: Position },
    #[error("{position}: cannot find object for \"{name}\": type error or inconsistent model")]
    Resolution { name: String, position: Position },
    #[error("cannot rename predeclared identifier \"{name}\"")]
    CannotRenamePredeclared { name: String },
    #[error("no identifier at {filename}:{line}:{column}")]
    NotFound {
        filename: String,
        line: u32,
        column: u32,
    },
}

pub fn resolve(program: &Program, ident: IdentId) -> Result<Vec<SymbolId>, ResolveError> {
    let symbols = match program.binding(ident) {
        Some(symbol) => vec![symbol],
        None => resolve_unbound(program, ident)?,
    };

    if let Some(&predeclared) = symbols
        .iter()
        .find(|&&s| program.symbol(s).is_predeclared())
    {
        return Err(ResolveError::CannotRenamePredeclared {
            name: program.symbol(predeclared).name.clone(),
        });
    }

    Ok(symbols)
}

fn resolve_unbound(program: &Program, ident: IdentId) -> Result<Vec<SymbolId>, ResolveError> {
    let record = program.ident(ident);
    let unit = program.unit(record.unit);
    let path = path_to(&unit.file, ident).unwrap_or_default();

    if path.len() == 2 && path[1].is_file() {
        debug!(name = %record.name, "package clause cannot be renamed");
        return Err(ResolveError::UnsupportedRename {
            name: record.name.clone(),
            position: program.position(ident),
        });
    }

    let header = path.iter().skip(1).find_map(|node| match node {
        Node::Stmt(Stmt::TypeSwitch {
            binding: Some(binding),
            clauses,
            ..
        }) if *binding == ident => Some(clauses),
        _ => None,
    });
    if let Some(object) = header
        .and_then(|clauses| clauses.first())
        .and_then(|clause| unit.implicits.get(&clause.id))
    {
        return Ok(vec![*object]);
    }

    debug!(name = %record.name, position = %program.position(ident), "unbound identifier");
    Err(ResolveError::Resolution {
        name: record.name.clone(),
        position: program.position(ident),
    })
}

/// Resolves the occurrence starting at `line:column` of `filename`.
pub fn resolve_at(
    program: &Program,
    filename: &str,
    line: u32,
    column: u32,
) -> Result<Vec<SymbolId>, ResolveError> {
    let ident = program
        .unit_by_filename(filename)
        .and_then(|unit| program.ident_at(unit, Pos::new(line, column)))
        .ok_or_else(|| ResolveError::NotFound {
            filename: filename.to_string(),
            line,
            column,
        })?;
    resolve(program, ident)
}
