//! Uniform traversal over the syntax tree.
//!
//! [`walk_file`] drives a [`Visitor`] through every node in source order.
//! `enter` may return `ControlFlow::Break` to stop the whole walk, which is
//! how [`path_to`] finishes as soon as it reaches its target.

use std::ops::ControlFlow;

use super::{
    Block, CaseClause, Decl, Expr, Field, File, FuncDecl, FuncType, GenDecl, IdentId, Spec, Stmt,
    TypeExpr,
};

#[derive(Debug, Clone, Copy)]
pub enum Node<'ast> {
    File(&'ast File),
    Decl(&'ast Decl),
    FuncDecl(&'ast FuncDecl),
    GenDecl(&'ast GenDecl),
    Spec(&'ast Spec),
    Field(&'ast Field),
    FuncType(&'ast FuncType),
    TypeExpr(&'ast TypeExpr),
    Block(&'ast Block),
    Stmt(&'ast Stmt),
    CaseClause(&'ast CaseClause),
    Expr(&'ast Expr),
    Ident(IdentId),
}

impl Node<'_> {
    pub fn as_ident(&self) -> Option<IdentId> {
        match self {
            Node::Ident(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }
}

pub trait Visitor<'ast> {
    fn enter(&mut self, _node: Node<'ast>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn leave(&mut self, _node: Node<'ast>) {}
}

pub fn walk_file<'ast, V: Visitor<'ast>>(v: &mut V, file: &'ast File) -> ControlFlow<()> {
    v.enter(Node::File(file))?;
    walk_ident(v, file.package_name)?;
    for decl in &file.decls {
        walk_decl(v, decl)?;
    }
    v.leave(Node::File(file));
    ControlFlow::Continue(())
}

fn walk_ident<'ast, V: Visitor<'ast>>(v: &mut V, id: IdentId) -> ControlFlow<()> {
    v.enter(Node::Ident(id))?;
    v.leave(Node::Ident(id));
    ControlFlow::Continue(())
}

fn walk_decl<'ast, V: Visitor<'ast>>(v: &mut V, decl: &'ast Decl) -> ControlFlow<()> {
    v.enter(Node::Decl(decl))?;
    match decl {
        Decl::Func(func) => walk_func_decl(v, func)?,
        Decl::Gen(gen_decl) => walk_gen_decl(v, gen_decl)?,
    }
    v.leave(Node::Decl(decl));
    ControlFlow::Continue(())
}

fn walk_func_decl<'ast, V: Visitor<'ast>>(v: &mut V, func: &'ast FuncDecl) -> ControlFlow<()> {
    v.enter(Node::FuncDecl(func))?;
    if let Some(recv) = &func.recv {
        walk_field(v, recv)?;
    }
    walk_ident(v, func.name)?;
    walk_func_type(v, &func.ty)?;
    if let Some(body) = &func.body {
        walk_block(v, body)?;
    }
    v.leave(Node::FuncDecl(func));
    ControlFlow::Continue(())
}

fn walk_gen_decl<'ast, V: Visitor<'ast>>(v: &mut V, gen_decl: &'ast GenDecl) -> ControlFlow<()> {
    v.enter(Node::GenDecl(gen_decl))?;
    for spec in &gen_decl.specs {
        walk_spec(v, spec)?;
    }
    v.leave(Node::GenDecl(gen_decl));
    ControlFlow::Continue(())
}

fn walk_spec<'ast, V: Visitor<'ast>>(v: &mut V, spec: &'ast Spec) -> ControlFlow<()> {
    v.enter(Node::Spec(spec))?;
    match spec {
        Spec::Import(import) => {
            if let Some(name) = import.name {
                walk_ident(v, name)?;
            }
        }
        Spec::Type(type_spec) => {
            walk_ident(v, type_spec.name)?;
            walk_type(v, &type_spec.ty)?;
        }
        Spec::Value(value) => {
            for &name in &value.names {
                walk_ident(v, name)?;
            }
            if let Some(ty) = &value.ty {
                walk_type(v, ty)?;
            }
            for expr in &value.values {
                walk_expr(v, expr)?;
            }
        }
    }
    v.leave(Node::Spec(spec));
    ControlFlow::Continue(())
}

fn walk_field<'ast, V: Visitor<'ast>>(v: &mut V, field: &'ast Field) -> ControlFlow<()> {
    v.enter(Node::Field(field))?;
    for &name in &field.names {
        walk_ident(v, name)?;
    }
    walk_type(v, &field.ty)?;
    v.leave(Node::Field(field));
    ControlFlow::Continue(())
}

fn walk_func_type<'ast, V: Visitor<'ast>>(v: &mut V, ty: &'ast FuncType) -> ControlFlow<()> {
    v.enter(Node::FuncType(ty))?;
    for field in ty.params.iter().chain(&ty.results) {
        walk_field(v, field)?;
    }
    v.leave(Node::FuncType(ty));
    ControlFlow::Continue(())
}

fn walk_type<'ast, V: Visitor<'ast>>(v: &mut V, ty: &'ast TypeExpr) -> ControlFlow<()> {
    v.enter(Node::TypeExpr(ty))?;
    match ty {
        TypeExpr::Name(id) => walk_ident(v, *id)?,
        TypeExpr::Qualified { package, name } => {
            walk_ident(v, *package)?;
            walk_ident(v, *name)?;
        }
        TypeExpr::Pointer(inner) | TypeExpr::Chan(inner) | TypeExpr::Ellipsis(inner) => {
            walk_type(v, inner)?
        }
        TypeExpr::Array { len, elem } => {
            if let Some(len) = len {
                walk_expr(v, len)?;
            }
            walk_type(v, elem)?;
        }
        TypeExpr::Map { key, value } => {
            walk_type(v, key)?;
            walk_type(v, value)?;
        }
        TypeExpr::Func(func) => walk_func_type(v, func)?,
        TypeExpr::Struct(fields) | TypeExpr::Interface(fields) => {
            for field in fields {
                walk_field(v, field)?;
            }
        }
    }
    v.leave(Node::TypeExpr(ty));
    ControlFlow::Continue(())
}

fn walk_block<'ast, V: Visitor<'ast>>(v: &mut V, block: &'ast Block) -> ControlFlow<()> {
    v.enter(Node::Block(block))?;
    for stmt in &block.stmts {
        walk_stmt(v, stmt)?;
    }
    v.leave(Node::Block(block));
    ControlFlow::Continue(())
}

fn walk_stmt<'ast, V: Visitor<'ast>>(v: &mut V, stmt: &'ast Stmt) -> ControlFlow<()> {
    v.enter(Node::Stmt(stmt))?;
    match stmt {
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => walk_expr(v, expr)?,
        Stmt::IncDec { x, .. } => walk_expr(v, x)?,
        Stmt::Assign { lhs, rhs, .. } => {
            for expr in lhs.iter().chain(rhs) {
                walk_expr(v, expr)?;
            }
        }
        Stmt::Decl(gen_decl) => walk_gen_decl(v, gen_decl)?,
        Stmt::Return(results) => {
            for expr in results {
                walk_expr(v, expr)?;
            }
        }
        Stmt::Block(block) => walk_block(v, block)?,
        Stmt::If {
            init,
            cond,
            then,
            otherwise,
        } => {
            if let Some(init) = init {
                walk_stmt(v, init)?;
            }
            walk_expr(v, cond)?;
            walk_block(v, then)?;
            if let Some(otherwise) = otherwise {
                walk_stmt(v, otherwise)?;
            }
        }
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => {
            if let Some(init) = init {
                walk_stmt(v, init)?;
            }
            if let Some(cond) = cond {
                walk_expr(v, cond)?;
            }
            if let Some(post) = post {
                walk_stmt(v, post)?;
            }
            walk_block(v, body)?;
        }
        Stmt::Range {
            key,
            value,
            expr,
            body,
            ..
        } => {
            if let Some(key) = key {
                walk_expr(v, key)?;
            }
            if let Some(value) = value {
                walk_expr(v, value)?;
            }
            walk_expr(v, expr)?;
            walk_block(v, body)?;
        }
        Stmt::Switch { init, tag, clauses } => {
            if let Some(init) = init {
                walk_stmt(v, init)?;
            }
            if let Some(tag) = tag {
                walk_expr(v, tag)?;
            }
            for clause in clauses {
                walk_clause(v, clause)?;
            }
        }
        Stmt::TypeSwitch {
            binding,
            subject,
            clauses,
        } => {
            if let Some(binding) = binding {
                walk_ident(v, *binding)?;
            }
            walk_expr(v, subject)?;
            for clause in clauses {
                walk_clause(v, clause)?;
            }
        }
        Stmt::Labeled { label, stmt } => {
            walk_ident(v, *label)?;
            walk_stmt(v, stmt)?;
        }
        Stmt::Branch { label, .. } => {
            if let Some(label) = label {
                walk_ident(v, *label)?;
            }
        }
    }
    v.leave(Node::Stmt(stmt));
    ControlFlow::Continue(())
}

fn walk_clause<'ast, V: Visitor<'ast>>(v: &mut V, clause: &'ast CaseClause) -> ControlFlow<()> {
    v.enter(Node::CaseClause(clause))?;
    for expr in &clause.exprs {
        walk_expr(v, expr)?;
    }
    for ty in &clause.types {
        walk_type(v, ty)?;
    }
    for stmt in &clause.body {
        walk_stmt(v, stmt)?;
    }
    v.leave(Node::CaseClause(clause));
    ControlFlow::Continue(())
}

fn walk_expr<'ast, V: Visitor<'ast>>(v: &mut V, expr: &'ast Expr) -> ControlFlow<()> {
    v.enter(Node::Expr(expr))?;
    match expr {
        Expr::Ident(id) => walk_ident(v, *id)?,
        Expr::Literal(_) => {}
        Expr::Selector { x, sel } => {
            walk_expr(v, x)?;
            walk_ident(v, *sel)?;
        }
        Expr::Call { func, args } => {
            walk_expr(v, func)?;
            for arg in args {
                walk_expr(v, arg)?;
            }
        }
        Expr::Index { x, index } => {
            walk_expr(v, x)?;
            walk_expr(v, index)?;
        }
        Expr::Unary { x, .. } | Expr::Star(x) | Expr::Paren(x) => walk_expr(v, x)?,
        Expr::Binary { x, y, .. } => {
            walk_expr(v, x)?;
            walk_expr(v, y)?;
        }
        Expr::Composite { ty, elts } => {
            if let Some(ty) = ty {
                walk_type(v, ty)?;
            }
            for elt in elts {
                walk_expr(v, elt)?;
            }
        }
        Expr::KeyValue { key, value } => {
            walk_expr(v, key)?;
            walk_expr(v, value)?;
        }
        Expr::FuncLit { ty, body } => {
            walk_func_type(v, ty)?;
            walk_block(v, body)?;
        }
        Expr::TypeAssert { x, ty } => {
            walk_expr(v, x)?;
            if let Some(ty) = ty {
                walk_type(v, ty)?;
            }
        }
        Expr::Type(ty) => walk_type(v, ty)?,
    }
    v.leave(Node::Expr(expr));
    ControlFlow::Continue(())
}

struct PathFinder<'ast> {
    target: IdentId,
    stack: Vec<Node<'ast>>,
    found: Option<Vec<Node<'ast>>>,
}

impl<'ast> Visitor<'ast> for PathFinder<'ast> {
    fn enter(&mut self, node: Node<'ast>) -> ControlFlow<()> {
        self.stack.push(node);
        if node.as_ident() == Some(self.target) {
            self.found = Some(self.stack.iter().rev().copied().collect());
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    }

    fn leave(&mut self, _node: Node<'ast>) {
        self.stack.pop();
    }
}

/// Returns the chain of nodes enclosing `target`, innermost first:
/// `[Ident, parent, ..., File]`.
pub fn path_to(file: &File, target: IdentId) -> Option<Vec<Node<'_>>> {
    let mut finder = PathFinder {
        target,
        stack: Vec::new(),
        found: None,
    };
    let _ = walk_file(&mut finder, file);
    finder.found
}

struct IdentCollector {
    idents: Vec<IdentId>,
}

impl<'ast> Visitor<'ast> for IdentCollector {
    fn enter(&mut self, node: Node<'ast>) -> ControlFlow<()> {
        if let Some(id) = node.as_ident() {
            self.idents.push(id);
        }
        ControlFlow::Continue(())
    }
}

/// Every identifier in the file, in source order.
pub fn idents(file: &File) -> Vec<IdentId> {
    let mut collector = IdentCollector { idents: Vec::new() };
    let _ = walk_file(&mut collector, file);
    collector.idents
}
