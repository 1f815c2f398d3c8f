//! Syntax tree for a compilation unit
//!
//! The tree is a closed set of node enums so every traversal has to match
//! exhaustively. Identifiers are not stored inline: each occurrence is an
//! [`IdentId`] into the program's identifier table, which is the only place
//! a spelling lives. Renaming therefore never changes the tree's shape.

pub mod visit;

use serde::{Deserialize, Serialize};

pub use visit::{Node, Visitor, idents, path_to, walk_file};

/// Handle of one identifier occurrence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IdentId(pub u32);

impl IdentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a case clause, used to key implicit type-switch objects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClauseId(pub u32);

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// Identifier of the `package` clause.
    pub package_name: IdentId,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    #[serde(default)]
    pub recv: Option<Field>,
    pub name: IdentId,
    pub ty: FuncType,
    #[serde(default)]
    pub body: Option<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncType {
    #[serde(default)]
    pub params: Vec<Field>,
    #[serde(default)]
    pub results: Vec<Field>,
}

/// A parameter, result, receiver, struct field or interface method.
///
/// Embedded fields and embedded interfaces have no names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub names: Vec<IdentId>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenKind {
    Import,
    Const,
    Type,
    Var,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub kind: GenKind,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spec {
    Import(ImportSpec),
    Type(TypeSpec),
    Value(ValueSpec),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    #[serde(default)]
    pub name: Option<IdentId>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: IdentId,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<IdentId>,
    #[serde(default)]
    pub ty: Option<TypeExpr>,
    #[serde(default)]
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    Name(IdentId),
    Qualified {
        package: IdentId,
        name: IdentId,
    },
    Pointer(Box<TypeExpr>),
    /// `[N]T`, or `[]T` when `len` is absent.
    Array {
        #[serde(default)]
        len: Option<Box<Expr>>,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan(Box<TypeExpr>),
    Ellipsis(Box<TypeExpr>),
    Func(FuncType),
    Struct(Vec<Field>),
    Interface(Vec<Field>),
}

impl TypeExpr {
    /// Strips any number of leading pointer indirections.
    pub fn deref(&self) -> &TypeExpr {
        match self {
            TypeExpr::Pointer(inner) => inner.deref(),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stmt {
    Expr(Expr),
    Assign {
        lhs: Vec<Expr>,
        define: bool,
        rhs: Vec<Expr>,
    },
    IncDec {
        x: Expr,
        inc: bool,
    },
    Decl(GenDecl),
    Return(Vec<Expr>),
    Go(Expr),
    Defer(Expr),
    Block(Block),
    If {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        cond: Expr,
        then: Block,
        #[serde(default)]
        otherwise: Option<Box<Stmt>>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        cond: Option<Expr>,
        #[serde(default)]
        post: Option<Box<Stmt>>,
        body: Block,
    },
    Range {
        #[serde(default)]
        key: Option<Expr>,
        #[serde(default)]
        value: Option<Expr>,
        define: bool,
        expr: Expr,
        body: Block,
    },
    Switch {
        #[serde(default)]
        init: Option<Box<Stmt>>,
        #[serde(default)]
        tag: Option<Expr>,
        clauses: Vec<CaseClause>,
    },
    /// `switch binding := subject.(type) { ... }`
    TypeSwitch {
        #[serde(default)]
        binding: Option<IdentId>,
        subject: Expr,
        clauses: Vec<CaseClause>,
    },
    Labeled {
        label: IdentId,
        stmt: Box<Stmt>,
    },
    Branch {
        keyword: BranchKind,
        #[serde(default)]
        label: Option<IdentId>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    pub id: ClauseId,
    #[serde(default)]
    pub exprs: Vec<Expr>,
    #[serde(default)]
    pub types: Vec<TypeExpr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident(IdentId),
    Literal(String),
    Selector {
        x: Box<Expr>,
        sel: IdentId,
    },
    Call {
        func: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Index {
        x: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: String,
        x: Box<Expr>,
    },
    Binary {
        x: Box<Expr>,
        op: String,
        y: Box<Expr>,
    },
    Star(Box<Expr>),
    Paren(Box<Expr>),
    Composite {
        #[serde(default)]
        ty: Option<TypeExpr>,
        #[serde(default)]
        elts: Vec<Expr>,
    },
    KeyValue {
        key: Box<Expr>,
        value: Box<Expr>,
    },
    FuncLit {
        ty: FuncType,
        body: Block,
    },
    /// `x.(T)`, or `x.(type)` inside a type switch when `ty` is absent.
    TypeAssert {
        x: Box<Expr>,
        #[serde(default)]
        ty: Option<TypeExpr>,
    },
    Type(TypeExpr),
}
