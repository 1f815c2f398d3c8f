//! Collection of exported declarations from syntax trees.

use tracing::debug;

use super::filter::NameFilter;
use crate::ast::{Decl, FuncDecl, FuncType, GenKind, IdentId, Spec, TypeExpr};
use crate::resolve::resolve;
use crate::semantic::{Program, SymbolId, UnitId, is_exported_name};

const TEST_PREFIXES: &[&str] = &["Test", "Example", "Benchmark"];

/// The declaration an exported name was found in.
#[derive(Debug, Clone, PartialEq)]
pub enum Enclosing {
    /// A function or method, with its signature.
    Func(FuncType),
    /// A type spec, with its type expression.
    Type(TypeExpr),
    /// A struct field, with the field's type.
    Field(TypeExpr),
    InterfaceMethod,
    /// A const or var spec, with its declared type if any.
    Value(Option<TypeExpr>),
}

#[derive(Debug, Clone)]
pub struct ExportRecord {
    pub unit: UnitId,
    pub ident: IdentId,
    pub name: String,
    pub symbols: Vec<SymbolId>,
    pub enclosing: Enclosing,
}

impl ExportRecord {
    pub fn is_type(&self) -> bool {
        matches!(self.enclosing, Enclosing::Type(_))
    }
}

struct Collector<'a> {
    program: &'a Program,
    unit: UnitId,
    filter: &'a NameFilter,
    skip_test_funcs: bool,
    records: Vec<ExportRecord>,
}

impl Collector<'_> {
    fn record(&mut self, ident: IdentId, enclosing: Enclosing) {
        let name = &self.program.ident(ident).name;
        if !self.filter.reports(name) {
            debug!(name = %name, "export filtered out");
            return;
        }

        match resolve(self.program, ident) {
            Ok(symbols) => self.records.push(ExportRecord {
                unit: self.unit,
                ident,
                name: name.clone(),
                symbols,
                enclosing,
            }),
            Err(err) => debug!(error = %err, "skipping unresolved export"),
        }
    }

    fn exported(&self, ident: IdentId) -> bool {
        is_exported_name(&self.program.ident(ident).name)
    }

    fn visit_func(&mut self, func: &FuncDecl) {
        if !self.exported(func.name) {
            return;
        }

        match &func.recv {
            None => {
                let name = &self.program.ident(func.name).name;
                if self.skip_test_funcs && TEST_PREFIXES.iter().any(|p| name.starts_with(p)) {
                    return;
                }
                self.record(func.name, Enclosing::Func(func.ty.clone()));
            }
            Some(recv) => {
                let base = match recv.ty.deref() {
                    TypeExpr::Name(id) => Some(*id),
                    _ => None,
                };
                if base.is_some_and(|id| self.exported(id)) {
                    self.record(func.name, Enclosing::Func(func.ty.clone()));
                }
            }
        }
    }

    fn visit_spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(_) => {}
            Spec::Type(type_spec) => {
                if self.exported(type_spec.name) {
                    self.record(type_spec.name, Enclosing::Type(type_spec.ty.clone()));
                }
                self.visit_type(&type_spec.ty);
            }
            Spec::Value(value) => {
                for &name in &value.names {
                    if self.exported(name) {
                        self.record(name, Enclosing::Value(value.ty.clone()));
                    }
                }
            }
        }
    }

    /// Exported members reachable through a type expression: struct fields
    /// and interface methods, through element, key and value types.
    fn visit_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Array { elem, .. } => self.visit_type(elem),
            TypeExpr::Chan(value) => self.visit_type(value),
            TypeExpr::Map { key, value } => {
                self.visit_type(value);
                self.visit_type(key);
            }
            TypeExpr::Struct(fields) => {
                for field in fields {
                    let mut exported = field.names.is_empty();
                    for &name in &field.names {
                        if self.exported(name) {
                            exported = true;
                            self.record(name, Enclosing::Field(field.ty.clone()));
                        }
                    }
                    if exported {
                        self.visit_type(&field.ty);
                    }
                }
            }
            TypeExpr::Interface(methods) => {
                for method in methods {
                    for &name in &method.names {
                        if self.exported(name) {
                            self.record(name, Enclosing::InterfaceMethod);
                        }
                    }
                }
            }
            TypeExpr::Name(_)
            | TypeExpr::Qualified { .. }
            | TypeExpr::Pointer(_)
            | TypeExpr::Ellipsis(_)
            | TypeExpr::Func(_) => {}
        }
    }
}

/// Exported declarations of `units`, in unit order then declaration order.
///
/// With `skip_tests`, test-only functions (`Test*`, `Example*`,
/// `Benchmark*` without a receiver) in test files are not reported.
pub fn collect_exports(
    program: &Program,
    units: &[UnitId],
    filter: &NameFilter,
    skip_tests: bool,
) -> Vec<ExportRecord> {
    let mut records = Vec::new();

    for &unit in units {
        let mut collector = Collector {
            program,
            unit,
            filter,
            skip_test_funcs: skip_tests && program.unit(unit).is_test(),
            records: Vec::new(),
        };

        for decl in &program.unit(unit).file.decls {
            match decl {
                Decl::Func(func) => collector.visit_func(func),
                Decl::Gen(gen_decl) if gen_decl.kind == GenKind::Import => {}
                Decl::Gen(gen_decl) => {
                    for spec in &gen_decl.specs {
                        collector.visit_spec(spec);
                    }
                }
            }
        }

        records.append(&mut collector.records);
    }

    records
}
