//! Deciding whether importers depend on exported declarations.

use tracing::debug;

use super::collect::{Enclosing, ExportRecord};
use crate::ast::{IdentId, TypeExpr};
use crate::semantic::{PackageId, Program, SymbolId};

/// How an importer was found to use an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMatch {
    /// An occurrence resolves to the exported symbol itself.
    Identity,
    /// An occurrence resolves to a symbol with the same name declared in a
    /// package with the same path. Only ever widens the used set.
    NameAndPackage,
}

/// Tests whether any occurrence in `importer` uses `record`.
///
/// Identity is tried over every occurrence before the weaker name and
/// package comparison.
pub fn uses_export(
    program: &Program,
    importer: PackageId,
    record: &ExportRecord,
) -> Option<UseMatch> {
    let mut uses: Vec<(IdentId, SymbolId)> = program
        .package(importer)
        .units
        .iter()
        .flat_map(|&unit| program.unit(unit).uses.iter().map(|(&i, &s)| (i, s)))
        .filter(|&(_, s)| !program.symbol(s).is_predeclared())
        .collect();
    uses.sort_by_key(|&(ident, _)| ident);

    if uses.iter().any(|(_, s)| record.symbols.contains(s)) {
        return Some(UseMatch::Identity);
    }

    for &target in &record.symbols {
        let target = program.symbol(target);
        let Some(target_package) = target.package else {
            continue;
        };
        let target_path = &program.package(target_package).path;

        let matched = uses.iter().any(|&(_, other)| {
            let other = program.symbol(other);
            other.name == target.name
                && other
                    .package
                    .is_some_and(|p| &program.package(p).path == target_path)
        });
        if matched {
            return Some(UseMatch::NameAndPackage);
        }
    }

    None
}

/// The exported records of `package` that no importer uses.
///
/// A package nobody imports has all of its exports unused. When only some
/// exports are used, unused type declarations reachable from the signature
/// of a used function or the type of a used field are kept as used.
pub fn unused_exports(
    program: &Program,
    package: PackageId,
    records: Vec<ExportRecord>,
) -> Vec<ExportRecord> {
    let importers = program.importers_of(package);
    if importers.is_empty() {
        debug!(package = %program.package(package).path, "no importers");
        return records;
    }

    let mut used = vec![false; records.len()];
    for &importer in &importers {
        for (i, record) in records.iter().enumerate() {
            if used[i] {
                continue;
            }
            if let Some(how) = uses_export(program, importer, record) {
                debug!(
                    importer = %program.package(importer).path,
                    name = %record.name,
                    how = ?how,
                    "export used"
                );
                used[i] = true;
            }
        }
    }

    let count = used.iter().filter(|&&u| u).count();
    if count == 0 {
        return records;
    }
    if count == records.len() {
        return Vec::new();
    }

    let (used_records, unused_records): (Vec<_>, Vec<_>) = records
        .into_iter()
        .zip(used)
        .partition(|(_, used)| *used);
    let used_records: Vec<ExportRecord> = used_records.into_iter().map(|(r, _)| r).collect();
    let unused_records: Vec<ExportRecord> = unused_records.into_iter().map(|(r, _)| r).collect();

    filter_indirect(program, &used_records, unused_records)
}

/// Drops unused type declarations that a used declaration exposes.
///
/// This is one pass over (used × unused): a type exposed only through the
/// field of another unused type stays unused.
pub(crate) fn filter_indirect(
    program: &Program,
    used: &[ExportRecord],
    unused: Vec<ExportRecord>,
) -> Vec<ExportRecord> {
    unused
        .into_iter()
        .filter(|candidate| {
            if !candidate.is_type() {
                return true;
            }

            let exposed = used.iter().any(|other| match &other.enclosing {
                Enclosing::Func(ty) => ty
                    .params
                    .iter()
                    .chain(&ty.results)
                    .any(|field| mentions_type(program, candidate, &field.ty)),
                Enclosing::Field(ty) => mentions_type(program, candidate, ty),
                Enclosing::Type(_) | Enclosing::InterfaceMethod | Enclosing::Value(_) => false,
            });
            if exposed {
                debug!(name = %candidate.name, "type used indirectly");
            }
            !exposed
        })
        .collect()
}

/// Whether `ty` names the candidate type, looking through pointers and the
/// element or value types of arrays, slices, maps and channels.
fn mentions_type(program: &Program, candidate: &ExportRecord, ty: &TypeExpr) -> bool {
    match ty {
        TypeExpr::Name(id) | TypeExpr::Qualified { name: id, .. } => {
            match program.binding(*id) {
                Some(symbol) => candidate.symbols.contains(&symbol),
                None => program.ident(*id).name == candidate.name,
            }
        }
        TypeExpr::Pointer(inner) | TypeExpr::Chan(inner) | TypeExpr::Ellipsis(inner) => {
            mentions_type(program, candidate, inner)
        }
        TypeExpr::Array { elem, .. } => mentions_type(program, candidate, elem),
        TypeExpr::Map { value, .. } => mentions_type(program, candidate, value),
        TypeExpr::Func(_) | TypeExpr::Struct(_) | TypeExpr::Interface(_) => false,
    }
}
