//! Statement AST nodes

use super::{DeclId, Expr};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Compound statement (block): { ... }
    Compound(CompoundStmt),

    /// If statement: if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) body
    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Return statement: return [expr];
    Return(Option<Expr>),

    /// Expression statement: [expr];
    Expr(Option<Expr>),
}

/// Compound statement: local declarations first, then statements
#[derive(Debug, Clone)]
pub struct CompoundStmt {
    pub locals: Vec<DeclId>,
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl CompoundStmt {
    pub fn new(locals: Vec<DeclId>, statements: Vec<Stmt>, span: Span) -> Self {
        Self { locals, statements, span }
    }
}
