//! Programmatic construction of a [`Program`]
//!
//! The low-level methods (`package`, `add_unit`, `scope`, `declare`,
//! `ident`, `bind_def`, `bind_use`) are what the snapshot loader drives. The
//! higher-level helpers (`func`, `method`, `struct_type`, `field`, ...) keep
//! the syntax tree and the binding maps consistent with each other and are
//! what tests and benchmarks use.

use id_arena::Arena;

use super::program::{CompilationUnit, Package, PackageId, Program, UnitId};
use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbols::{Symbol, SymbolId, SymbolKind, SymbolTable, TypeShape};
use crate::ast::{
    Block, ClauseId, Decl, Expr, Field, File, FuncDecl, FuncType, GenDecl, GenKind, IdentId,
    ImportSpec, Pos, Spec, Stmt, TypeExpr, TypeSpec, ValueSpec,
};

const PREDECLARED_TYPES: &[&str] = &[
    "any", "bool", "byte", "complex64", "complex128", "error", "float32", "float64", "int",
    "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr",
];

const PREDECLARED_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max",
    "min", "new", "panic", "print", "println", "real", "recover",
];

const PREDECLARED_CONSTS: &[&str] = &["false", "iota", "true"];

/// A declared function or method.
#[derive(Debug, Clone, Copy)]
pub struct FuncHandle {
    pub symbol: SymbolId,
    pub ident: IdentId,
    /// Scope of the function body.
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct TypeSwitchHandle {
    /// The `x` of `switch x := v.(type)`.
    pub binding: IdentId,
    pub clauses: Vec<ClauseHandle>,
}

#[derive(Debug, Clone, Copy)]
pub struct ClauseHandle {
    pub id: ClauseId,
    pub scope: ScopeId,
    /// The clause's implicitly declared object.
    pub object: SymbolId,
}

pub struct ProgramBuilder {
    program: Program,
    next_clause: u32,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        let mut scopes = ScopeTree::new();
        let universe = scopes.create_scope(ScopeKind::Universe, None, None);
        let mut builder = Self {
            program: Program {
                scopes,
                symbols: SymbolTable::new(),
                packages: Arena::new(),
                units: Arena::new(),
                idents: Vec::new(),
                universe,
            },
            next_clause: 0,
        };
        builder.predeclare();
        builder
    }

    fn predeclare(&mut self) {
        let universe = self.program.universe;
        let symbols = &mut self.program.symbols;

        for &name in PREDECLARED_TYPES {
            let id = symbols.declare(name, SymbolKind::Type, None, universe);
            let shape = if matches!(name, "any" | "error") {
                TypeShape::Interface
            } else {
                TypeShape::Other
            };
            symbols.get_mut(id).shape = Some(shape);
            if name == "error" {
                let method = symbols.declare_member("Error", SymbolKind::Method, None, id);
                symbols.get_mut(method).signature = Some("() string".to_string());
            }
        }
        for &name in PREDECLARED_FUNCS {
            symbols.declare(name, SymbolKind::Function, None, universe);
        }
        for &name in PREDECLARED_CONSTS {
            symbols.declare(name, SymbolKind::Constant, None, universe);
        }
        symbols.declare("nil", SymbolKind::Variable, None, universe);
    }

    pub fn universe(&self) -> ScopeId {
        self.program.universe
    }

    pub fn predeclared(&self, name: &str) -> Option<SymbolId> {
        self.program.symbols.lookup_local(name, self.program.universe)
    }

    pub fn package(&mut self, path: &str, name: &str) -> PackageId {
        let universe = self.program.universe;
        let scope = self
            .program
            .scopes
            .create_scope(ScopeKind::Package, Some(universe), None);
        let id = self.program.packages.alloc_with_id(|id| Package {
            id,
            path: path.to_string(),
            name: name.to_string(),
            scope,
            units: Vec::new(),
            imports: Vec::new(),
        });
        self.program.scopes.get_mut(scope).package = Some(id);
        id
    }

    /// Records that `from` imports `to`.
    pub fn import(&mut self, from: PackageId, to: PackageId) {
        let imports = &mut self.program.packages[from].imports;
        if !imports.contains(&to) {
            imports.push(to);
        }
    }

    pub fn package_scope(&self, package: PackageId) -> ScopeId {
        self.program.packages[package].scope
    }

    pub fn file_scope(&self, unit: UnitId) -> ScopeId {
        self.program.units[unit].scope
    }

    /// Adds a unit whose syntax tree is already complete.
    pub fn add_unit(&mut self, package: PackageId, filename: &str, file: File) -> UnitId {
        let package_scope = self.package_scope(package);
        let scope = self
            .program
            .scopes
            .create_scope(ScopeKind::File, Some(package_scope), Some(package));
        let id = self.program.units.alloc_with_id(|id| CompilationUnit {
            id,
            filename: filename.to_string(),
            package,
            scope,
            file,
            defs: Default::default(),
            uses: Default::default(),
            implicits: Default::default(),
        });
        self.program.packages[package].units.push(id);
        id
    }

    /// Adds an empty unit with its `package` clause.
    pub fn unit(&mut self, package: PackageId, filename: &str) -> UnitId {
        let placeholder = File {
            package_name: IdentId(0),
            decls: Vec::new(),
        };
        let id = self.add_unit(package, filename, placeholder);
        let name = self.program.packages[package].name.clone();
        let scope = self.file_scope(id);
        let clause = self.ident(id, scope, &name, Pos::new(1, 9), false);
        self.program.units[id].file.package_name = clause;
        id
    }

    pub fn scope(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let package = self.program.scopes.get(parent).package;
        self.program.scopes.create_scope(kind, Some(parent), package)
    }

    pub fn ident(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        name: &str,
        pos: Pos,
        qualified: bool,
    ) -> IdentId {
        let id = IdentId(self.program.idents.len() as u32);
        self.program.idents.push(super::program::Ident {
            name: name.to_string(),
            pos,
            unit,
            scope,
            qualified,
        });
        id
    }

    pub fn ident_count(&self) -> usize {
        self.program.idents.len()
    }

    pub fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: Option<PackageId>,
        scope: ScopeId,
    ) -> SymbolId {
        self.program.symbols.declare(name, kind, package, scope)
    }

    pub fn declare_member(
        &mut self,
        name: &str,
        kind: SymbolKind,
        package: Option<PackageId>,
        owner: SymbolId,
    ) -> SymbolId {
        self.program
            .symbols
            .declare_member(name, kind, package, owner)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        self.program.symbols.get(id)
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        self.program.symbols.get_mut(id)
    }

    pub fn set_signature(&mut self, id: SymbolId, signature: &str) {
        self.symbol_mut(id).signature = Some(signature.to_string());
    }

    pub fn bind_def(&mut self, ident: IdentId, symbol: SymbolId) {
        let unit = self.program.idents[ident.index()].unit;
        self.program.units[unit].defs.insert(ident, symbol);
        let symbol = self.program.symbols.get_mut(symbol);
        if symbol.decl.is_none() {
            symbol.decl = Some(ident);
        }
    }

    pub fn bind_use(&mut self, ident: IdentId, symbol: SymbolId) {
        let unit = self.program.idents[ident.index()].unit;
        self.program.units[unit].uses.insert(ident, symbol);
    }

    pub fn clause(&mut self) -> ClauseId {
        let id = ClauseId(self.next_clause);
        self.next_clause += 1;
        id
    }

    pub fn bind_implicit(&mut self, unit: UnitId, clause: ClauseId, symbol: SymbolId) {
        self.program.units[unit].implicits.insert(clause, symbol);
        self.next_clause = self.next_clause.max(clause.0 + 1);
    }

    pub fn push_decl(&mut self, unit: UnitId, decl: Decl) {
        self.program.units[unit].file.decls.push(decl);
    }

    /// Declares `name` in `scope` together with its defining occurrence.
    ///
    /// Top-level declarations live in the package scope while their
    /// occurrence sits in the unit's file scope.
    pub fn define(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        name: &str,
        kind: SymbolKind,
        pos: Pos,
    ) -> (SymbolId, IdentId) {
        let package = Some(self.program.units[unit].package);
        let symbol = self.declare(name, kind, package, scope);
        let ident_scope = if self.program.scopes.get(scope).kind == ScopeKind::Package {
            self.file_scope(unit)
        } else {
            scope
        };
        let ident = self.ident(unit, ident_scope, name, pos, false);
        self.bind_def(ident, symbol);
        (symbol, ident)
    }

    pub fn define_member(
        &mut self,
        unit: UnitId,
        owner: SymbolId,
        name: &str,
        kind: SymbolKind,
        pos: Pos,
    ) -> (SymbolId, IdentId) {
        let package = Some(self.program.units[unit].package);
        let symbol = self.declare_member(name, kind, package, owner);
        let scope = self.file_scope(unit);
        let ident = self.ident(unit, scope, name, pos, false);
        self.bind_def(ident, symbol);
        (symbol, ident)
    }

    /// Adds a use of `symbol` spelled with its current name.
    pub fn refer(&mut self, unit: UnitId, scope: ScopeId, symbol: SymbolId, pos: Pos) -> IdentId {
        let name = self.symbol(symbol).name.clone();
        let ident = self.ident(unit, scope, &name, pos, false);
        self.bind_use(ident, symbol);
        ident
    }

    /// Adds a use of `symbol` as the selector of `x.Name`.
    pub fn refer_qualified(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        symbol: SymbolId,
        pos: Pos,
    ) -> IdentId {
        let name = self.symbol(symbol).name.clone();
        let ident = self.ident(unit, scope, &name, pos, true);
        self.bind_use(ident, symbol);
        ident
    }

    pub fn func(&mut self, unit: UnitId, name: &str, pos: Pos) -> FuncHandle {
        let package_scope = self.package_scope(self.program.units[unit].package);
        let (symbol, ident) = self.define(unit, package_scope, name, SymbolKind::Function, pos);
        self.set_signature(symbol, "()");
        let scope = self.scope(ScopeKind::Function, self.file_scope(unit));
        self.push_decl(
            unit,
            Decl::Func(FuncDecl {
                recv: None,
                name: ident,
                ty: FuncType::default(),
                body: Some(Block::default()),
            }),
        );
        FuncHandle {
            symbol,
            ident,
            scope,
        }
    }

    /// Declares method `name` on `recv`. The receiver type occurrence is
    /// placed on the same line at column 7, as in `func (T) Name()`.
    pub fn method(
        &mut self,
        unit: UnitId,
        recv: SymbolId,
        name: &str,
        signature: &str,
        pos: Pos,
    ) -> FuncHandle {
        let file_scope = self.file_scope(unit);
        let recv_ty = self.type_name(unit, file_scope, recv, Pos::new(pos.line, 7));
        let (symbol, ident) = self.define_member(unit, recv, name, SymbolKind::Method, pos);
        self.set_signature(symbol, signature);
        let scope = self.scope(ScopeKind::Function, file_scope);
        self.push_decl(
            unit,
            Decl::Func(FuncDecl {
                recv: Some(Field {
                    names: Vec::new(),
                    ty: recv_ty,
                }),
                name: ident,
                ty: FuncType::default(),
                body: Some(Block::default()),
            }),
        );
        FuncHandle {
            symbol,
            ident,
            scope,
        }
    }

    fn type_decl(
        &mut self,
        unit: UnitId,
        name: &str,
        shape: TypeShape,
        ty: TypeExpr,
        pos: Pos,
    ) -> SymbolId {
        let package_scope = self.package_scope(self.program.units[unit].package);
        let (symbol, ident) = self.define(unit, package_scope, name, SymbolKind::Type, pos);
        self.symbol_mut(symbol).shape = Some(shape);
        self.push_decl(
            unit,
            Decl::Gen(GenDecl {
                kind: GenKind::Type,
                specs: vec![Spec::Type(TypeSpec { name: ident, ty })],
            }),
        );
        symbol
    }

    pub fn struct_type(&mut self, unit: UnitId, name: &str, pos: Pos) -> SymbolId {
        self.type_decl(unit, name, TypeShape::Struct, TypeExpr::Struct(Vec::new()), pos)
    }

    pub fn interface_type(&mut self, unit: UnitId, name: &str, pos: Pos) -> SymbolId {
        self.type_decl(
            unit,
            name,
            TypeShape::Interface,
            TypeExpr::Interface(Vec::new()),
            pos,
        )
    }

    /// Declares `type name underlying` for a non-struct, non-interface type.
    pub fn named_type(
        &mut self,
        unit: UnitId,
        name: &str,
        underlying: TypeExpr,
        pos: Pos,
    ) -> SymbolId {
        self.type_decl(unit, name, TypeShape::Other, underlying, pos)
    }

    fn type_spec_mut(&mut self, unit: UnitId, owner: SymbolId) -> Option<&mut TypeExpr> {
        let decl = self.program.symbols.get(owner).decl?;
        self.program.units[unit]
            .file
            .decls
            .iter_mut()
            .filter_map(|d| match d {
                Decl::Gen(gen_decl) => Some(gen_decl),
                Decl::Func(_) => None,
            })
            .flat_map(|gen_decl| gen_decl.specs.iter_mut())
            .find_map(|spec| match spec {
                Spec::Type(type_spec) if type_spec.name == decl => Some(&mut type_spec.ty),
                _ => None,
            })
    }

    fn push_member_field(&mut self, unit: UnitId, owner: SymbolId, field: Field) {
        if let Some(TypeExpr::Struct(fields) | TypeExpr::Interface(fields)) =
            self.type_spec_mut(unit, owner)
        {
            fields.push(field);
        }
    }

    pub fn field(
        &mut self,
        unit: UnitId,
        owner: SymbolId,
        name: &str,
        ty: TypeExpr,
        pos: Pos,
    ) -> SymbolId {
        let (symbol, ident) = self.define_member(unit, owner, name, SymbolKind::Field, pos);
        self.push_member_field(
            unit,
            owner,
            Field {
                names: vec![ident],
                ty,
            },
        );
        symbol
    }

    /// Adds an embedded field (or embedded interface) to `owner`.
    pub fn embed(&mut self, unit: UnitId, owner: SymbolId, ty: TypeExpr) {
        self.push_member_field(
            unit,
            owner,
            Field {
                names: Vec::new(),
                ty,
            },
        );
    }

    pub fn interface_method(
        &mut self,
        unit: UnitId,
        iface: SymbolId,
        name: &str,
        signature: &str,
        pos: Pos,
    ) -> SymbolId {
        let (symbol, ident) = self.define_member(unit, iface, name, SymbolKind::Method, pos);
        self.set_signature(symbol, signature);
        self.push_member_field(
            unit,
            iface,
            Field {
                names: vec![ident],
                ty: TypeExpr::Func(FuncType::default()),
            },
        );
        symbol
    }

    /// Declares a package-level `var` or `const`.
    pub fn value(
        &mut self,
        unit: UnitId,
        kind: SymbolKind,
        name: &str,
        ty: Option<TypeExpr>,
        pos: Pos,
    ) -> SymbolId {
        let package_scope = self.package_scope(self.program.units[unit].package);
        let (symbol, ident) = self.define(unit, package_scope, name, kind, pos);
        let gen_kind = if kind == SymbolKind::Constant {
            GenKind::Const
        } else {
            GenKind::Var
        };
        self.push_decl(
            unit,
            Decl::Gen(GenDecl {
                kind: gen_kind,
                specs: vec![Spec::Value(ValueSpec {
                    names: vec![ident],
                    ty,
                    values: Vec::new(),
                })],
            }),
        );
        symbol
    }

    pub fn type_name(&mut self, unit: UnitId, scope: ScopeId, ty: SymbolId, pos: Pos) -> TypeExpr {
        TypeExpr::Name(self.refer(unit, scope, ty, pos))
    }

    /// `pkg.Name` as a type. The selector follows the package name and dot.
    pub fn qualified_type(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        package_name: SymbolId,
        ty: SymbolId,
        pos: Pos,
    ) -> TypeExpr {
        let (package, name) = self.qualified_pair(unit, scope, package_name, ty, pos);
        TypeExpr::Qualified { package, name }
    }

    fn qualified_pair(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        package_name: SymbolId,
        target: SymbolId,
        pos: Pos,
    ) -> (IdentId, IdentId) {
        let width = self.symbol(package_name).name.chars().count() as u32;
        let package = self.refer(unit, scope, package_name, pos);
        let name = self.refer_qualified(
            unit,
            scope,
            target,
            Pos::new(pos.line, pos.column + width + 1),
        );
        (package, name)
    }

    /// Imports `imported` into `unit` under its package name.
    pub fn import_name(&mut self, unit: UnitId, imported: PackageId) -> SymbolId {
        let (from, scope) = {
            let unit = &self.program.units[unit];
            (unit.package, unit.scope)
        };
        let (name, path) = {
            let package = &self.program.packages[imported];
            (package.name.clone(), package.path.clone())
        };
        let symbol = self.declare(&name, SymbolKind::PackageName, Some(from), scope);
        self.symbol_mut(symbol).imported = Some(imported);
        self.push_decl(
            unit,
            Decl::Gen(GenDecl {
                kind: GenKind::Import,
                specs: vec![Spec::Import(ImportSpec { name: None, path })],
            }),
        );
        self.import(from, imported);
        symbol
    }

    pub fn func_decl_mut(&mut self, unit: UnitId, func: IdentId) -> Option<&mut FuncDecl> {
        self.program.units[unit]
            .file
            .decls
            .iter_mut()
            .find_map(|decl| match decl {
                Decl::Func(func_decl) if func_decl.name == func => Some(func_decl),
                _ => None,
            })
    }

    pub fn push_stmt(&mut self, unit: UnitId, func: IdentId, stmt: Stmt) {
        if let Some(body) = self
            .func_decl_mut(unit, func)
            .and_then(|decl| decl.body.as_mut())
        {
            body.stmts.push(stmt);
        }
    }

    /// Adds a named parameter to `func`, declared in its body scope.
    pub fn param(
        &mut self,
        unit: UnitId,
        func: &FuncHandle,
        name: &str,
        ty: TypeExpr,
        pos: Pos,
    ) -> SymbolId {
        let (symbol, ident) = self.define(unit, func.scope, name, SymbolKind::Variable, pos);
        if let Some(decl) = self.func_decl_mut(unit, func.ident) {
            decl.ty.params.push(Field {
                names: vec![ident],
                ty,
            });
        }
        symbol
    }

    /// Adds an unnamed result to `func`.
    pub fn result(&mut self, unit: UnitId, func: &FuncHandle, ty: TypeExpr) {
        if let Some(decl) = self.func_decl_mut(unit, func.ident) {
            decl.ty.results.push(Field {
                names: Vec::new(),
                ty,
            });
        }
    }

    /// `callee()` as a statement.
    pub fn call_stmt(&mut self, unit: UnitId, scope: ScopeId, callee: SymbolId, pos: Pos) -> Stmt {
        let func = self.refer(unit, scope, callee, pos);
        Stmt::Expr(Expr::Call {
            func: Box::new(Expr::Ident(func)),
            args: Vec::new(),
        })
    }

    /// `pkg.Callee()` as a statement.
    pub fn qualified_call(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        package_name: SymbolId,
        callee: SymbolId,
        pos: Pos,
    ) -> Stmt {
        let (package, sel) = self.qualified_pair(unit, scope, package_name, callee, pos);
        Stmt::Expr(Expr::Call {
            func: Box::new(Expr::Selector {
                x: Box::new(Expr::Ident(package)),
                sel,
            }),
            args: Vec::new(),
        })
    }

    /// Declares the header and per-clause objects of
    /// `switch binding := v.(type)` inside `scope`. The caller assembles the
    /// statement from the returned handles.
    pub fn type_switch(
        &mut self,
        unit: UnitId,
        scope: ScopeId,
        binding: &str,
        pos: Pos,
        clause_count: usize,
    ) -> TypeSwitchHandle {
        let header = self.ident(unit, scope, binding, pos, false);
        let package = Some(self.program.units[unit].package);
        let clauses = (0..clause_count)
            .map(|_| {
                let id = self.clause();
                let clause_scope = self.scope(ScopeKind::TypeSwitchClause, scope);
                let object = self.declare(binding, SymbolKind::Variable, package, clause_scope);
                let symbol = self.symbol_mut(object);
                symbol.implicit = true;
                symbol.decl = Some(header);
                self.bind_implicit(unit, id, object);
                ClauseHandle {
                    id,
                    scope: clause_scope,
                    object,
                }
            })
            .collect();
        TypeSwitchHandle {
            binding: header,
            clauses,
        }
    }

    pub fn build(self) -> Program {
        self.program
    }
}
