//! Symbol table for tracking declarations
//!
//! Every semantic object lives in one arena and is addressed by a
//! [`SymbolId`]; two occurrences denote the same object exactly when they
//! are bound to the same id. Lexically scoped symbols are indexed by name per
//! scope. Fields and methods have no lexical scope: they are members of
//! their owner type and are found through [`SymbolTable::members`].

use std::collections::HashMap;

use id_arena::{Arena, Id};
use serde::{Deserialize, Serialize};

use super::program::PackageId;
use super::scope::{ScopeId, ScopeTree};
use crate::ast::IdentId;

pub type SymbolId = Id<Symbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Type,
    Function,
    Method,
    Field,
    Variable,
    Constant,
    PackageName,
    Label,
}

impl SymbolKind {
    pub fn describe(self) -> &'static str {
        match self {
            SymbolKind::Type => "type",
            SymbolKind::Function => "func",
            SymbolKind::Method => "method",
            SymbolKind::Field => "field",
            SymbolKind::Variable => "var",
            SymbolKind::Constant => "const",
            SymbolKind::PackageName => "imported package name",
            SymbolKind::Label => "label",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeShape {
    Struct,
    Interface,
    Other,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Declaring package; `None` for predeclared symbols.
    pub package: Option<PackageId>,
    /// Declaring scope; `None` for fields and methods.
    pub scope: Option<ScopeId>,
    /// Receiver type of a method, or the struct/interface owning a field.
    pub owner: Option<SymbolId>,
    /// Normalized signature text of funcs and methods, compared verbatim.
    pub signature: Option<String>,
    pub shape: Option<TypeShape>,
    /// Package referred to by an import name.
    pub imported: Option<PackageId>,
    pub decl: Option<IdentId>,
    /// Object implicitly declared by a type switch clause.
    pub implicit: bool,
}

impl Symbol {
    pub fn is_exported(&self) -> bool {
        is_exported_name(&self.name)
    }

    pub fn is_predeclared(&self) -> bool {
        self.package.is_none()
    }

    pub fn is_interface(&self) -> bool {
        self.shape == Some(TypeShape::Interface)
    }
}

pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[derive(Debug, Clone)]
pub struct SymbolTable {
    arena: Arena<Symbol>,
    by_scope: HashMap<ScopeId, HashMap<String, SymbolId>>,
    members: HashMap<SymbolId, Vec<SymbolId>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            by_scope: HashMap::new(),
            members: HashMap::new(),
        }
    }

    fn alloc(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: Option<PackageId>,
        scope: Option<ScopeId>,
        owner: Option<SymbolId>,
    ) -> SymbolId {
        self.arena.alloc_with_id(|id| Symbol {
            id,
            name: name.to_string(),
            kind,
            package,
            scope,
            owner,
            signature: None,
            shape: None,
            imported: None,
            decl: None,
            implicit: false,
        })
    }

    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: Option<PackageId>,
        scope: ScopeId,
    ) -> SymbolId {
        let id = self.alloc(name, kind, package, Some(scope), None);

        self.by_scope
            .entry(scope)
            .or_default()
            .insert(name.to_string(), id);

        id
    }

    /// Declares a field or method of `owner`.
    pub fn declare_member(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: Option<PackageId>,
        owner: SymbolId,
    ) -> SymbolId {
        let id = self.alloc(name, kind, package, None, Some(owner));
        self.members.entry(owner).or_default().push(id);
        id
    }

    pub fn lookup(&self, name: &str, scope: ScopeId, scope_tree: &ScopeTree) -> Option<SymbolId> {
        if let Some(id) = self.lookup_local(name, scope) {
            return Some(id);
        }

        if let Some(parent) = scope_tree.get(scope).parent {
            return self.lookup(name, parent, scope_tree);
        }

        None
    }

    pub fn lookup_local(&self, name: &str, scope: ScopeId) -> Option<SymbolId> {
        self.by_scope
            .get(&scope)
            .and_then(|symbols| symbols.get(name))
            .copied()
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.arena[id]
    }

    pub fn get_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.arena[id]
    }

    /// Changes a symbol's spelling, keeping the per-scope index in sync.
    pub fn rename(&mut self, id: SymbolId, new_name: &str) {
        let symbol = &mut self.arena[id];
        let old_name = std::mem::replace(&mut symbol.name, new_name.to_string());

        let Some(scope) = symbol.scope else {
            return;
        };
        let names = self.by_scope.entry(scope).or_default();
        if names.get(&old_name) == Some(&id) {
            names.remove(&old_name);
        }
        names.insert(new_name.to_string(), id);
    }

    pub fn members(&self, owner: SymbolId) -> &[SymbolId] {
        self.members.get(&owner).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn member_named(&self, owner: SymbolId, name: &str) -> Option<SymbolId> {
        self.members(owner)
            .iter()
            .copied()
            .find(|&id| self.arena[id].name == name)
    }

    pub fn symbols_in_scope(&self, scope: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.by_scope
            .get(&scope)
            .into_iter()
            .flat_map(|symbols| symbols.values().map(|&id| &self.arena[id]))
    }

    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.arena.iter().map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }
}
