//! Symbol table and scope management

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::{Decl, DeclArena, DeclId};
use std::collections::HashMap;
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Functions every program can call without declaring them
pub const BUILTINS: [&str; 2] = ["input", "output"];

/// Stack of scopes, innermost last. Index 0 is the global scope.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<DefaultSymbol, DeclId>>,
    interner: DefaultStringInterner,
}

impl SymbolTable {
    /// Open the global scope and bind the built-in functions in it.
    ///
    /// Built-in declarations are allocated in `decls` alongside the
    /// program's own.
    pub fn new(decls: &mut DeclArena) -> CompileResult<Self> {
        let mut table = Self {
            scopes: vec![HashMap::new()],
            interner: DefaultStringInterner::new(),
        };

        for name in BUILTINS {
            let id = decls.alloc(Decl::builtin(name));
            table.insert(decls, id)?;
        }

        Ok(table)
    }

    /// Index of the innermost open scope
    pub fn depth(&self) -> usize {
        self.scopes.len().saturating_sub(1)
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
        tracing::trace!(depth = self.depth(), "enter scope");
    }

    pub fn exit_scope(&mut self) -> CompileResult<()> {
        tracing::trace!(depth = self.depth(), "exit scope");
        self.scopes
            .pop()
            .map(|_| ())
            .ok_or_else(|| CompileError::internal("exit_scope with no open scope"))
    }

    /// Bind `id` in the innermost scope and record the scope index on the
    /// declaration.
    pub fn insert(&mut self, decls: &mut DeclArena, id: DeclId) -> CompileResult<()> {
        let depth = self
            .scopes
            .len()
            .checked_sub(1)
            .ok_or_else(|| CompileError::internal("insert with no open scope"))?;

        let decl = &decls[id];
        let symbol = self.interner.get_or_intern(&decl.name);
        let scope = &mut self.scopes[depth];

        if let Some(&previous) = scope.get(&symbol) {
            return Err(CompileError::redeclared(
                decl.name.clone(),
                decl.span,
                decls[previous].span,
            ));
        }

        scope.insert(symbol, id);
        decls[id].depth = Some(depth);
        Ok(())
    }

    /// Find the nearest enclosing declaration of `name`
    pub fn lookup(&self, name: &str, span: Span) -> CompileResult<DeclId> {
        self.interner
            .get(name)
            .and_then(|symbol| {
                self.scopes
                    .iter()
                    .rev()
                    .find_map(|scope| scope.get(&symbol).copied())
            })
            .ok_or_else(|| CompileError::undeclared(name, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::ValueType;

    fn variable(decls: &mut DeclArena, name: &str, line: u32) -> DeclId {
        decls.alloc(Decl::variable(
            name.to_string(),
            ValueType::Int,
            Span::new(0, 1, line, 1),
        ))
    }

    #[test]
    fn test_builtins_are_global() {
        let mut decls = DeclArena::new();
        let table = SymbolTable::new(&mut decls).unwrap();

        for name in BUILTINS {
            let id = table.lookup(name, Span::default()).unwrap();
            assert!(decls[id].is_function());
            assert!(decls[id].ty.is_void());
            assert_eq!(decls[id].depth, Some(0));
        }
        assert_eq!(table.depth(), 0);
    }

    #[test]
    fn test_insert_records_depth() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        let global = variable(&mut decls, "x", 1);
        table.insert(&mut decls, global).unwrap();
        table.enter_scope();
        table.enter_scope();
        let inner = variable(&mut decls, "y", 2);
        table.insert(&mut decls, inner).unwrap();

        assert_eq!(decls[global].depth, Some(0));
        assert_eq!(decls[inner].depth, Some(2));
    }

    #[test]
    fn test_same_scope_redeclaration_fails() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        let first = variable(&mut decls, "x", 1);
        let second = variable(&mut decls, "x", 2);
        table.insert(&mut decls, first).unwrap();
        let err = table.insert(&mut decls, second).unwrap_err();

        match err {
            CompileError::Redeclared { name, span, previous } => {
                assert_eq!(name, "x");
                assert_eq!(span.line, 2);
                assert_eq!(previous.line, 1);
            }
            other => panic!("expected redeclaration, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_cannot_be_redeclared_globally() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        let input = variable(&mut decls, "input", 1);
        assert!(matches!(
            table.insert(&mut decls, input),
            Err(CompileError::Redeclared { .. })
        ));
    }

    #[test]
    fn test_lookup_prefers_innermost_binding() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        let outer = variable(&mut decls, "x", 1);
        table.insert(&mut decls, outer).unwrap();
        table.enter_scope();
        let inner = variable(&mut decls, "x", 2);
        table.insert(&mut decls, inner).unwrap();

        assert_eq!(table.lookup("x", Span::default()).unwrap(), inner);
        table.exit_scope().unwrap();
        assert_eq!(table.lookup("x", Span::default()).unwrap(), outer);
    }

    #[test]
    fn test_lookup_undeclared() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        table.enter_scope();
        let y = variable(&mut decls, "y", 1);
        table.insert(&mut decls, y).unwrap();
        table.exit_scope().unwrap();

        let span = Span::new(5, 6, 3, 4);
        assert!(matches!(
            table.lookup("y", span),
            Err(CompileError::Undeclared { ref name, span: s }) if name == "y" && s == span
        ));
        assert!(matches!(
            table.lookup("never", span),
            Err(CompileError::Undeclared { .. })
        ));
    }

    #[test]
    fn test_exit_scope_underflow() {
        let mut decls = DeclArena::new();
        let mut table = SymbolTable::new(&mut decls).unwrap();

        table.exit_scope().unwrap();
        assert!(matches!(table.exit_scope(), Err(CompileError::Internal { .. })));

        let x = variable(&mut decls, "x", 1);
        assert!(matches!(
            table.insert(&mut decls, x),
            Err(CompileError::Internal { .. })
        ));
    }
}
