//! Snapshot interchange format
//!
//! A snapshot is the loader's output serialized as JSON: packages, units
//! with their syntax trees, local scopes, symbols and identifier
//! occurrences, all cross-referenced by position in their arrays. Package
//! and file scopes are implied by the packages and units that own them.
//! Predeclared objects are referred to by name.
//!
//! Every index is checked before anything is built, so a malformed snapshot
//! is rejected with the first dangling reference instead of a panic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::ast::{ClauseId, File, IdentId, Pos, idents};
use crate::semantic::{
    PackageId, Program, ProgramBuilder, ScopeId, ScopeKind, SymbolId, SymbolKind, TypeShape,
    UnitId,
};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("snapshot refers to missing {what} #{index}")]
    DanglingIndex { what: &'static str, index: usize },
    #[error("snapshot refers to unknown predeclared identifier \"{name}\"")]
    UnknownPredeclared { name: String },
    #[error("invalid {what} #{index}: {reason}")]
    Invalid {
        what: &'static str,
        index: usize,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeRef {
    Universe,
    Package(usize),
    File(usize),
    Local(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SymbolRef {
    Index(usize),
    Predeclared(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub imports: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub kind: ScopeKind,
    pub parent: ScopeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub package: usize,
    /// Declaring scope; absent for fields and methods.
    #[serde(default)]
    pub scope: Option<ScopeRef>,
    #[serde(default)]
    pub owner: Option<usize>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub shape: Option<TypeShape>,
    #[serde(default)]
    pub imported: Option<usize>,
    /// Declaring identifier when it is not a definition, as for type switch
    /// clause objects.
    #[serde(default)]
    pub decl: Option<usize>,
    #[serde(default)]
    pub implicit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitEntry {
    pub clause: ClauseId,
    pub symbol: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitEntry {
    pub filename: String,
    pub package: usize,
    pub file: File,
    #[serde(default)]
    pub implicits: Vec<ImplicitEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentEntry {
    pub name: String,
    pub line: u32,
    pub column: u32,
    pub unit: usize,
    pub scope: ScopeRef,
    #[serde(default)]
    pub qualified: bool,
    #[serde(default)]
    pub def: Option<SymbolRef>,
    #[serde(default, rename = "use")]
    pub use_: Option<SymbolRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Packages named on the command line, as opposed to importers loaded
    /// to see their uses. Empty means all of them.
    pub initial: Vec<usize>,
    pub packages: Vec<PackageEntry>,
    pub units: Vec<UnitEntry>,
    pub scopes: Vec<ScopeEntry>,
    pub symbols: Vec<SymbolEntry>,
    pub idents: Vec<IdentEntry>,
}

/// A program together with the packages the user asked about.
#[derive(Debug, Clone)]
pub struct LoadedProgram {
    pub program: Program,
    pub initial: Vec<PackageId>,
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_snapshot(path: &Path) -> Result<LoadedProgram, SnapshotError> {
    let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Snapshot::from_json(&content)?.into_program()
}

fn check(what: &'static str, index: usize, len: usize) -> Result<(), SnapshotError> {
    if index < len {
        Ok(())
    } else {
        Err(SnapshotError::DanglingIndex { what, index })
    }
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    fn validate_scope_ref(&self, scope: ScopeRef, locals: usize) -> Result<(), SnapshotError> {
        match scope {
            ScopeRef::Universe => Ok(()),
            ScopeRef::Package(i) => check("package", i, self.packages.len()),
            ScopeRef::File(i) => check("unit", i, self.units.len()),
            ScopeRef::Local(i) => check("scope", i, locals),
        }
    }

    fn validate_symbol_ref(&self, symbol: &SymbolRef) -> Result<(), SnapshotError> {
        match symbol {
            SymbolRef::Index(i) => check("symbol", *i, self.symbols.len()),
            SymbolRef::Predeclared(_) => Ok(()),
        }
    }

    /// Checks every cross reference without building anything.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        for &index in &self.initial {
            check("package", index, self.packages.len())?;
        }
        for package in &self.packages {
            for &import in &package.imports {
                check("package", import, self.packages.len())?;
            }
        }

        for (index, scope) in self.scopes.iter().enumerate() {
            if matches!(
                scope.kind,
                ScopeKind::Universe | ScopeKind::Package | ScopeKind::File
            ) {
                return Err(SnapshotError::Invalid {
                    what: "scope",
                    index,
                    reason: "universe, package and file scopes are implied",
                });
            }
            // Parents come first so scopes can be created in order.
            self.validate_scope_ref(scope.parent, index)?;
        }

        for (index, symbol) in self.symbols.iter().enumerate() {
            check("package", symbol.package, self.packages.len())?;
            if let Some(scope) = symbol.scope {
                self.validate_scope_ref(scope, self.scopes.len())?;
            }
            if let Some(imported) = symbol.imported {
                check("package", imported, self.packages.len())?;
            }
            if let Some(decl) = symbol.decl {
                check("ident", decl, self.idents.len())?;
            }
            match (symbol.scope, symbol.owner) {
                (Some(_), None) => {}
                (None, Some(owner)) => {
                    check("symbol", owner, self.symbols.len())?;
                    if self.symbols[owner].owner.is_some() {
                        return Err(SnapshotError::Invalid {
                            what: "symbol",
                            index,
                            reason: "owner is itself a member",
                        });
                    }
                }
                _ => {
                    return Err(SnapshotError::Invalid {
                        what: "symbol",
                        index,
                        reason: "exactly one of scope and owner must be set",
                    });
                }
            }
        }

        for unit in &self.units {
            check("package", unit.package, self.packages.len())?;
            for ident in idents(&unit.file) {
                check("ident", ident.index(), self.idents.len())?;
            }
            for implicit in &unit.implicits {
                check("symbol", implicit.symbol, self.symbols.len())?;
            }
        }

        for ident in &self.idents {
            check("unit", ident.unit, self.units.len())?;
            self.validate_scope_ref(ident.scope, self.scopes.len())?;
            for symbol in ident.def.iter().chain(ident.use_.iter()) {
                self.validate_symbol_ref(symbol)?;
            }
        }

        Ok(())
    }

    /// Validates the snapshot and builds the program it describes.
    pub fn into_program(self) -> Result<LoadedProgram, SnapshotError> {
        self.validate()?;

        let mut b = ProgramBuilder::new();
        let packages: Vec<PackageId> = self
            .packages
            .iter()
            .map(|p| b.package(&p.path, &p.name))
            .collect();
        for (index, package) in self.packages.iter().enumerate() {
            for &import in &package.imports {
                b.import(packages[index], packages[import]);
            }
        }

        let units: Vec<UnitId> = self
            .units
            .iter()
            .map(|u| b.add_unit(packages[u.package], &u.filename, u.file.clone()))
            .collect();

        let mut locals: Vec<ScopeId> = Vec::with_capacity(self.scopes.len());
        for scope in &self.scopes {
            let parent = scope_id(&b, scope.parent, &packages, &units, &locals);
            locals.push(b.scope(scope.kind, parent));
        }

        // Owners before their members.
        let mut symbols: Vec<Option<SymbolId>> = vec![None; self.symbols.len()];
        for (index, entry) in self.symbols.iter().enumerate() {
            if let Some(scope) = entry.scope {
                let scope = scope_id(&b, scope, &packages, &units, &locals);
                let id = b.declare(&entry.name, entry.kind, Some(packages[entry.package]), scope);
                symbols[index] = Some(id);
            }
        }
        for (index, entry) in self.symbols.iter().enumerate() {
            let Some(owner) = entry.owner else {
                continue;
            };
            let owner = symbols[owner].ok_or(SnapshotError::DanglingIndex {
                what: "owner",
                index: owner,
            })?;
            let id =
                b.declare_member(&entry.name, entry.kind, Some(packages[entry.package]), owner);
            symbols[index] = Some(id);
        }
        let symbols: Vec<SymbolId> = symbols
            .into_iter()
            .enumerate()
            .map(|(index, id)| id.ok_or(SnapshotError::DanglingIndex { what: "symbol", index }))
            .collect::<Result<_, _>>()?;

        for (index, entry) in self.symbols.iter().enumerate() {
            let symbol = b.symbol_mut(symbols[index]);
            symbol.signature = entry.signature.clone();
            symbol.shape = entry.shape;
            symbol.imported = entry.imported.map(|p| packages[p]);
            symbol.implicit = entry.implicit;
        }

        for entry in &self.idents {
            let scope = scope_id(&b, entry.scope, &packages, &units, &locals);
            let ident = b.ident(
                units[entry.unit],
                scope,
                &entry.name,
                Pos::new(entry.line, entry.column),
                entry.qualified,
            );
            if let Some(def) = &entry.def {
                let symbol = symbol_id(&b, def, &symbols)?;
                b.bind_def(ident, symbol);
            }
            if let Some(use_) = &entry.use_ {
                let symbol = symbol_id(&b, use_, &symbols)?;
                b.bind_use(ident, symbol);
            }
        }

        for (index, entry) in self.symbols.iter().enumerate() {
            if let Some(decl) = entry.decl {
                b.symbol_mut(symbols[index]).decl = Some(IdentId(decl as u32));
            }
        }
        for (index, unit) in self.units.iter().enumerate() {
            for implicit in &unit.implicits {
                b.bind_implicit(units[index], implicit.clause, symbols[implicit.symbol]);
            }
        }

        let initial = if self.initial.is_empty() {
            packages.clone()
        } else {
            self.initial.iter().map(|&p| packages[p]).collect()
        };

        info!(
            packages = packages.len(),
            units = units.len(),
            symbols = symbols.len(),
            idents = self.idents.len(),
            "loaded snapshot"
        );
        Ok(LoadedProgram {
            program: b.build(),
            initial,
        })
    }
}

fn scope_id(
    b: &ProgramBuilder,
    scope: ScopeRef,
    packages: &[PackageId],
    units: &[UnitId],
    locals: &[ScopeId],
) -> ScopeId {
    match scope {
        ScopeRef::Universe => b.universe(),
        ScopeRef::Package(i) => b.package_scope(packages[i]),
        ScopeRef::File(i) => b.file_scope(units[i]),
        ScopeRef::Local(i) => locals[i],
    }
}

fn symbol_id(
    b: &ProgramBuilder,
    symbol: &SymbolRef,
    symbols: &[SymbolId],
) -> Result<SymbolId, SnapshotError> {
    match symbol {
        SymbolRef::Index(i) => Ok(symbols[*i]),
        SymbolRef::Predeclared(name) => b.predeclared(name).ok_or_else(|| {
            debug!(%name, "unknown predeclared identifier");
            SnapshotError::UnknownPredeclared { name: name.clone() }
        }),
    }
}
