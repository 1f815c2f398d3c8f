//! Shared programs for integration tests.
//!
//! ```text
//! shapes/shapes.go                          app/main.go
//!  1 package shapes                          1 package main
//!  3 type Shape interface {                  3 import "example.com/shapes"
//!  4     Area() float64                      5 func main() {
//!  5 }                                       6     shapes.NewSquare(...)
//!  7 type Square struct {                    7 }
//!  8     Side float64
//!  9 }
//! 11 func (s Square) Area() float64 {}
//! 13 type Options struct {
//! 14     Scale float64
//! 15 }
//! 17 func NewSquare(opts Options) *Square {}
//! 19 func Unused() {}
//! 21 const Version = "1"
//! ```

#![allow(dead_code)]

use rebind_core::ast::{Pos, TypeExpr};
use rebind_core::semantic::{
    FuncHandle, PackageId, Program, ProgramBuilder, SymbolId, SymbolKind,
};

pub struct Shapes {
    pub program: Program,
    pub shapes: PackageId,
    pub app: PackageId,
    pub shape: SymbolId,
    pub shape_area: SymbolId,
    pub square: SymbolId,
    pub side: SymbolId,
    pub square_area: FuncHandle,
    pub options: SymbolId,
    pub new_square: FuncHandle,
    pub unused: FuncHandle,
    pub version: SymbolId,
}

pub fn shapes() -> Shapes {
    let mut b = ProgramBuilder::new();
    let float64 = b.predeclared("float64").unwrap();

    let shapes = b.package("example.com/shapes", "shapes");
    let unit = b.unit(shapes, "shapes/shapes.go");
    let file = b.file_scope(unit);

    let shape = b.interface_type(unit, "Shape", Pos::new(3, 6));
    let shape_area = b.interface_method(unit, shape, "Area", "() float64", Pos::new(4, 2));

    let square = b.struct_type(unit, "Square", Pos::new(7, 6));
    let ty = b.type_name(unit, file, float64, Pos::new(8, 7));
    let side = b.field(unit, square, "Side", ty, Pos::new(8, 2));
    let square_area = b.method(unit, square, "Area", "() float64", Pos::new(11, 17));

    let options = b.struct_type(unit, "Options", Pos::new(13, 6));
    let ty = b.type_name(unit, file, float64, Pos::new(14, 8));
    b.field(unit, options, "Scale", ty, Pos::new(14, 2));

    let new_square = b.func(unit, "NewSquare", Pos::new(17, 6));
    b.set_signature(new_square.symbol, "(Options) *Square");
    let ty = b.type_name(unit, new_square.scope, options, Pos::new(17, 21));
    b.param(unit, &new_square, "opts", ty, Pos::new(17, 16));
    let ty = b.type_name(unit, new_square.scope, square, Pos::new(17, 31));
    b.result(unit, &new_square, TypeExpr::Pointer(Box::new(ty)));

    let unused = b.func(unit, "Unused", Pos::new(19, 6));
    let version = b.value(unit, SymbolKind::Constant, "Version", None, Pos::new(21, 7));

    let app = b.package("example.com/app", "main");
    let app_unit = b.unit(app, "app/main.go");
    let shapes_name = b.import_name(app_unit, shapes);
    let main = b.func(app_unit, "main", Pos::new(5, 6));
    let call =
        b.qualified_call(app_unit, main.scope, shapes_name, new_square.symbol, Pos::new(6, 2));
    b.push_stmt(app_unit, main.ident, call);

    Shapes {
        program: b.build(),
        shapes,
        app,
        shape,
        shape_area,
        square,
        side,
        square_area,
        options,
        new_square,
        unused,
        version,
    }
}

/// Lowercases the first letter, the way a caller-supplied naming function
/// would for simple names.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
