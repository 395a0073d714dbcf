//! Declaration AST nodes
//!
//! Declaration headers live in a [`DeclArena`] and are addressed by
//! [`DeclId`]. The tree refers to them by handle, and so do the symbol table
//! and every resolved identifier use.

use super::{CompoundStmt, ValueType};
use crate::common::Span;
use std::ops::{Index, IndexMut};

/// Stable handle to a declaration in a [`DeclArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declaration header: everything name resolution and type checking need
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    /// Declared type (`int` or `void`); for arrays, the element type
    pub ty: ValueType,
    pub kind: DeclKind,
    pub span: Span,
    /// Index of the scope the declaration was bound in (0 = global).
    /// Set by the symbol table on insertion.
    pub depth: Option<usize>,
}

/// Shape of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// Scalar variable: int x;
    Variable,
    /// Fixed-size array: int a[10];
    Array { size: usize },
    /// Function; `builtin` marks `input`/`output`
    Function { params: Vec<DeclId>, builtin: bool },
    /// Function parameter: int x or int x[]
    Parameter { is_array: bool },
}

impl Decl {
    fn new(name: String, ty: ValueType, kind: DeclKind, span: Span) -> Self {
        Self {
            name,
            ty,
            kind,
            span,
            depth: None,
        }
    }

    pub fn variable(name: String, ty: ValueType, span: Span) -> Self {
        Self::new(name, ty, DeclKind::Variable, span)
    }

    pub fn array(name: String, ty: ValueType, size: usize, span: Span) -> Self {
        Self::new(name, ty, DeclKind::Array { size }, span)
    }

    pub fn parameter(name: String, ty: ValueType, is_array: bool, span: Span) -> Self {
        Self::new(name, ty, DeclKind::Parameter { is_array }, span)
    }

    pub fn function(name: String, ty: ValueType, params: Vec<DeclId>, span: Span) -> Self {
        Self::new(name, ty, DeclKind::Function { params, builtin: false }, span)
    }

    /// `input`/`output`: void functions without a source location
    pub fn builtin(name: &str) -> Self {
        Self::new(
            name.to_string(),
            ValueType::Void,
            DeclKind::Function { params: Vec::new(), builtin: true },
            Span::default(),
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclKind::Function { .. })
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, DeclKind::Function { builtin: true, .. })
    }

    /// Array declarations and array parameters
    pub fn is_array(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Array { .. } | DeclKind::Parameter { is_array: true }
        )
    }

    /// Type a plain (unsubscripted) use of this declaration evaluates to
    pub fn value_type(&self) -> ValueType {
        if self.is_array() {
            ValueType::Array
        } else {
            self.ty
        }
    }

    pub fn params(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Function { params, .. } => params,
            _ => &[],
        }
    }

    /// Human-readable kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            DeclKind::Variable => "variable",
            DeclKind::Array { .. } => "array variable",
            DeclKind::Function { .. } => "function",
            DeclKind::Parameter { .. } => "parameter",
        }
    }
}

/// Owner of every declaration header in a program
#[derive(Debug, Clone, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(i, d)| (DeclId(i as u32), d))
    }
}

impl Index<DeclId> for DeclArena {
    type Output = Decl;

    fn index(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }
}

impl IndexMut<DeclId> for DeclArena {
    fn index_mut(&mut self, id: DeclId) -> &mut Decl {
        &mut self.decls[id.index()]
    }
}

/// Top-level declaration
#[derive(Debug, Clone)]
pub enum Declaration {
    /// Global variable or array
    Variable(DeclId),
    /// Function definition
    Function(FunctionDecl),
}

impl Declaration {
    pub fn id(&self) -> DeclId {
        match self {
            Declaration::Variable(id) => *id,
            Declaration::Function(func) => func.id,
        }
    }
}

/// Function definition: header in the arena, body in the tree
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub body: CompoundStmt,
}

impl FunctionDecl {
    pub fn new(id: DeclId, body: CompoundStmt) -> Self {
        Self { id, body }
    }
}
