pub mod builder;
pub mod program;
pub mod scope;
pub mod symbols;

pub use builder::{ClauseHandle, FuncHandle, ProgramBuilder, TypeSwitchHandle};
pub use program::{CompilationUnit, Ident, Package, PackageId, Position, Program, UnitId};
pub use scope::{Scope, ScopeId, ScopeKind, ScopeTree};
pub use symbols::{Symbol, SymbolId, SymbolKind, SymbolTable, TypeShape, is_exported_name};
