//! The loaded program snapshot
//!
//! A [`Program`] owns every package, compilation unit, scope, symbol and
//! identifier occurrence of one analysis run. Components borrow it; only
//! the mutator takes it mutably.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use id_arena::{Arena, Id};
use serde::Serialize;

use super::scope::{ScopeId, ScopeTree};
use super::symbols::{Symbol, SymbolId, SymbolTable};
use crate::ast::{self, ClauseId, IdentId, Pos};

pub type PackageId = Id<Package>;
pub type UnitId = Id<CompilationUnit>;

#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    pub path: String,
    pub name: String,
    pub scope: ScopeId,
    pub units: Vec<UnitId>,
    pub imports: Vec<PackageId>,
}

#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub id: UnitId,
    pub filename: String,
    pub package: PackageId,
    /// File scope holding the unit's import names.
    pub scope: ScopeId,
    pub file: ast::File,
    pub defs: HashMap<IdentId, SymbolId>,
    pub uses: HashMap<IdentId, SymbolId>,
    /// Objects implicitly declared by type switch clauses.
    pub implicits: HashMap<ClauseId, SymbolId>,
}

impl CompilationUnit {
    pub fn is_test(&self) -> bool {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.ends_with("_test"))
    }

    /// The symbol an occurrence in this unit is bound to, uses first.
    pub fn binding(&self, ident: IdentId) -> Option<SymbolId> {
        self.uses
            .get(&ident)
            .or_else(|| self.defs.get(&ident))
            .copied()
    }
}

/// One occurrence of an identifier in source text.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
    pub unit: UnitId,
    /// Innermost scope enclosing the occurrence.
    pub scope: ScopeId,
    /// Appears as the selector of `x.Name`.
    pub qualified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub filename: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) scopes: ScopeTree,
    pub(crate) symbols: SymbolTable,
    pub(crate) packages: Arena<Package>,
    pub(crate) units: Arena<CompilationUnit>,
    pub(crate) idents: Vec<Ident>,
    pub(crate) universe: ScopeId,
}

impl Program {
    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.symbols.get(id)
    }

    pub fn universe(&self) -> ScopeId {
        self.universe
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id]
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter().map(|(_, p)| p)
    }

    pub fn package_by_path(&self, path: &str) -> Option<PackageId> {
        self.packages().find(|p| p.path == path).map(|p| p.id)
    }

    pub fn unit(&self, id: UnitId) -> &CompilationUnit {
        &self.units[id]
    }

    pub fn units(&self) -> impl Iterator<Item = &CompilationUnit> {
        self.units.iter().map(|(_, u)| u)
    }

    pub fn unit_by_filename(&self, filename: &str) -> Option<UnitId> {
        self.units().find(|u| u.filename == filename).map(|u| u.id)
    }

    pub fn ident(&self, id: IdentId) -> &Ident {
        &self.idents[id.index()]
    }

    pub fn ident_count(&self) -> usize {
        self.idents.len()
    }

    /// Finds the occurrence starting at `pos` in `unit`.
    pub fn ident_at(&self, unit: UnitId, pos: Pos) -> Option<IdentId> {
        self.idents
            .iter()
            .position(|ident| ident.unit == unit && ident.pos == pos)
            .map(|index| IdentId(index as u32))
    }

    pub fn position(&self, id: IdentId) -> Position {
        let ident = self.ident(id);
        Position {
            filename: self.unit(ident.unit).filename.clone(),
            line: ident.pos.line,
            column: ident.pos.column,
        }
    }

    /// Position of the declaring identifier, if the symbol has one.
    pub fn symbol_position(&self, id: SymbolId) -> Option<Position> {
        self.symbols.get(id).decl.map(|decl| self.position(decl))
    }

    /// The symbol an occurrence is bound to, as a use or a definition.
    pub fn binding(&self, id: IdentId) -> Option<SymbolId> {
        self.unit(self.ident(id).unit).binding(id)
    }

    /// Every occurrence bound to `symbol`, in identifier order.
    pub fn occurrences(&self, symbol: SymbolId) -> Vec<IdentId> {
        let mut found: Vec<IdentId> = self
            .units()
            .flat_map(|unit| unit.defs.iter().chain(unit.uses.iter()))
            .filter(|&(_, &sym)| sym == symbol)
            .map(|(&ident, _)| ident)
            .collect();
        found.sort();
        found.dedup();
        found
    }

    /// Packages whose import set contains `package`, ordered by path.
    pub fn importers_of(&self, package: PackageId) -> Vec<PackageId> {
        let mut importers: Vec<&Package> = self
            .packages()
            .filter(|p| p.imports.contains(&package))
            .collect();
        importers.sort_by(|a, b| a.path.cmp(&b.path));
        importers.into_iter().map(|p| p.id).collect()
    }

    /// Units of the given packages, ordered by filename.
    pub fn units_of(&self, packages: &[PackageId]) -> Vec<UnitId> {
        let mut units: Vec<&CompilationUnit> = packages
            .iter()
            .flat_map(|&p| self.package(p).units.iter().map(|&u| self.unit(u)))
            .collect();
        units.sort_by(|a, b| a.filename.cmp(&b.filename));
        units.into_iter().map(|u| u.id).collect()
    }

    pub(crate) fn ident_mut(&mut self, id: IdentId) -> &mut Ident {
        &mut self.idents[id.index()]
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::builder::ProgramBuilder;

    #[test]
    fn test_files_are_recognised_by_stem() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let plain = b.unit(pkg, "a/a.go");
        let test = b.unit(pkg, "a/a_test.go");
        let program = b.build();

        assert!(!program.unit(plain).is_test());
        assert!(program.unit(test).is_test());
    }

    #[test]
    fn importers_are_sorted_by_path() {
        let mut b = ProgramBuilder::new();
        let lib = b.package("example.com/lib", "lib");
        let zed = b.package("example.com/zed", "zed");
        let app = b.package("example.com/app", "app");
        b.import(zed, lib);
        b.import(app, lib);
        let program = b.build();

        let importers: Vec<&str> = program
            .importers_of(lib)
            .into_iter()
            .map(|p| program.package(p).path.as_str())
            .collect();

        assert_eq!(importers, vec!["example.com/app", "example.com/zed"]);
        assert!(program.importers_of(app).is_empty());
    }

    #[test]
    fn position_displays_file_line_column() {
        let position = Position {
            filename: "a/a.go".to_string(),
            line: 3,
            column: 6,
        };

        assert_eq!(position.to_string(), "a/a.go:3:6");
    }

    #[test]
    fn occurrences_include_definition_and_uses() {
        let mut b = ProgramBuilder::new();
        let pkg = b.package("example.com/a", "a");
        let unit = b.unit(pkg, "a/a.go");
        let helper = b.func(unit, "helper", Pos::new(3, 6));
        let main = b.func(unit, "main", Pos::new(5, 6));
        let call = b.call_stmt(unit, main.scope, helper.symbol, Pos::new(6, 2));
        b.push_stmt(unit, main.ident, call);
        let program = b.build();

        let occurrences = program.occurrences(helper.symbol);

        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0], helper.ident);
        assert_eq!(program.position(occurrences[1]).to_string(), "a/a.go:6:2");
        assert_eq!(
            program.ident_at(unit, Pos::new(6, 2)),
            Some(occurrences[1])
        );
    }
}
