//! Abstract Syntax Tree definitions

mod types;
mod expr;
mod stmt;
mod decl;
mod dump;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use dump::TreeDumper;

/// A complete C- program: top-level declarations in source order, plus the
/// arena that owns every declaration header in the tree.
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    pub decls: DeclArena,
}

impl Program {
    pub fn new(declarations: Vec<Declaration>, decls: DeclArena) -> Self {
        Self { declarations, decls }
    }

    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id]
    }

    /// Function definitions in source order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(func) => Some(func),
            Declaration::Variable(_) => None,
        })
    }

    /// Look up a top-level function definition by name
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions().find(|f| self.decls[f.id].name == name)
    }
}
