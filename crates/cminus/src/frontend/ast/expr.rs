//! Expression AST nodes

use super::{DeclId, ValueType};
use crate::common::Span;

/// Expression node
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
    pub ty: TypeState,
}

/// Value type of an expression.
///
/// Identifier-based expressions start out `Provisional` and only become
/// `Resolved` once name resolution has seen them. Consumers read types
/// through [`Expr::resolved_type`], which refuses provisional guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeState {
    Provisional(ValueType),
    Resolved(ValueType),
}

/// Link from an identifier use to its declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    Unresolved,
    Resolved(DeclId),
}

impl Binding {
    pub fn decl(&self) -> Option<DeclId> {
        match self {
            Binding::Unresolved => None,
            Binding::Resolved(id) => Some(*id),
        }
    }
}

/// A named variable use (the base of plain and subscripted references)
#[derive(Debug, Clone)]
pub struct VarRef {
    pub name: String,
    pub binding: Binding,
}

impl VarRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: Binding::Unresolved,
        }
    }
}

impl Expr {
    fn new(kind: ExprKind, span: Span, ty: TypeState) -> Self {
        Self { kind, span, ty }
    }

    pub fn int_literal(value: i32, span: Span) -> Self {
        Self::new(ExprKind::IntLiteral(value), span, TypeState::Resolved(ValueType::Int))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Self {
        Self::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
            TypeState::Resolved(ValueType::Int),
        )
    }

    pub fn var(var: VarRef, span: Span, provisional: ValueType) -> Self {
        Self::new(ExprKind::Var(var), span, TypeState::Provisional(provisional))
    }

    pub fn subscript(var: VarRef, index: Expr, span: Span, provisional: ValueType) -> Self {
        Self::new(
            ExprKind::Subscript {
                var,
                index: Box::new(index),
            },
            span,
            TypeState::Provisional(provisional),
        )
    }

    pub fn call(callee: VarRef, args: Vec<Expr>, span: Span, provisional: ValueType) -> Self {
        Self::new(ExprKind::Call { callee, args }, span, TypeState::Provisional(provisional))
    }

    pub fn assign(target: Expr, value: Expr, span: Span, provisional: ValueType) -> Self {
        Self::new(
            ExprKind::Assign {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
            TypeState::Provisional(provisional),
        )
    }

    /// The resolved value type, or `None` while the type is still a guess
    pub fn resolved_type(&self) -> Option<ValueType> {
        match self.ty {
            TypeState::Resolved(ty) => Some(ty),
            TypeState::Provisional(_) => None,
        }
    }

    pub fn set_resolved_type(&mut self, ty: ValueType) {
        self.ty = TypeState::Resolved(ty);
    }

    /// The identifier this expression is built on, if any
    pub fn identifier(&self) -> Option<&VarRef> {
        match &self.kind {
            ExprKind::Var(var) | ExprKind::Subscript { var, .. } => Some(var),
            ExprKind::Call { callee, .. } => Some(callee),
            _ => None,
        }
    }
}

/// Expression kinds
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Assignment: x = y, a[i] = y (target is a `Var` or `Subscript`)
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },

    /// Variable reference: x
    Var(VarRef),

    /// Array subscript: a[i]
    Subscript {
        var: VarRef,
        index: Box<Expr>,
    },

    /// Function call: f(a, b)
    Call {
        callee: VarRef,
        args: Vec<Expr>,
    },

    /// Binary operation: a + b, x * y, i < n
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Integer literal: 42
    IntLiteral(i32),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Additive
    Add,
    Sub,

    // Multiplicative
    Mul,
    Div,

    // Relational
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Precedence class of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Additive,
    Multiplicative,
    Relational,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    pub fn class(&self) -> OperatorClass {
        match self {
            BinaryOp::Add | BinaryOp::Sub => OperatorClass::Additive,
            BinaryOp::Mul | BinaryOp::Div => OperatorClass::Multiplicative,
            _ => OperatorClass::Relational,
        }
    }
}
