//! Scope binding: the first semantic pass
//!
//! Walks the tree once in source order, binding every declaration in the
//! scope it appears in and resolving every identifier use by lookup. Each
//! resolved use gets its declaration handle and its true value type,
//! replacing the parser's provisional guess.
//!
//! Scopes: a function opens one scope for its parameters and the locals of
//! its body; every nested compound statement opens its own; an `if`/`while`
//! arm that is a single statement is wrapped in a scope of its own as well.

use super::SymbolTable;
use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;

pub struct ScopeBinder<'p> {
    symbols: SymbolTable,
    decls: &'p mut DeclArena,
}

impl<'p> ScopeBinder<'p> {
    /// Bind all declarations and resolve all identifier uses in `program`
    #[tracing::instrument(name = "bind", skip_all, fields(declarations = program.declarations.len()))]
    pub fn bind(program: &mut Program) -> CompileResult<()> {
        let Program { declarations, decls } = program;
        let mut binder = ScopeBinder {
            symbols: SymbolTable::new(decls)?,
            decls,
        };

        for declaration in declarations.iter_mut() {
            binder.bind_declaration(declaration)?;
        }

        tracing::debug!(depth = binder.symbols.depth(), "scope binding complete");
        Ok(())
    }

    fn bind_declaration(&mut self, declaration: &mut Declaration) -> CompileResult<()> {
        match declaration {
            Declaration::Variable(id) => self.symbols.insert(self.decls, *id),
            Declaration::Function(func) => self.bind_function(func),
        }
    }

    fn bind_function(&mut self, func: &mut FunctionDecl) -> CompileResult<()> {
        self.symbols.insert(self.decls, func.id)?;

        self.symbols.enter_scope();
        let params = self.decls[func.id].params().to_vec();
        for param in params {
            self.symbols.insert(self.decls, param)?;
        }
        self.bind_block(&mut func.body)?;
        self.symbols.exit_scope()
    }

    /// Bind a block's locals and statements in the current scope
    fn bind_block(&mut self, block: &mut CompoundStmt) -> CompileResult<()> {
        for &local in &block.locals {
            self.symbols.insert(self.decls, local)?;
        }
        for stmt in &mut block.statements {
            self.bind_stmt(stmt)?;
        }
        Ok(())
    }

    fn bind_stmt(&mut self, stmt: &mut Stmt) -> CompileResult<()> {
        match &mut stmt.kind {
            StmtKind::Compound(block) => {
                self.symbols.enter_scope();
                self.bind_block(block)?;
                self.symbols.exit_scope()
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.bind_expr(condition)?;
                self.bind_arm(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.bind_arm(else_branch)?;
                }
                Ok(())
            }

            StmtKind::While { condition, body } => {
                self.bind_expr(condition)?;
                self.bind_arm(body)
            }

            StmtKind::Return(value) | StmtKind::Expr(value) => match value {
                Some(expr) => self.bind_expr(expr),
                None => Ok(()),
            },
        }
    }

    /// Bind a branch or loop body inside a scope of its own
    fn bind_arm(&mut self, stmt: &mut Stmt) -> CompileResult<()> {
        if matches!(stmt.kind, StmtKind::Compound(_)) {
            return self.bind_stmt(stmt);
        }

        self.symbols.enter_scope();
        self.bind_stmt(stmt)?;
        self.symbols.exit_scope()
    }

    fn bind_expr(&mut self, expr: &mut Expr) -> CompileResult<()> {
        let span = expr.span;

        let resolved = match &mut expr.kind {
            ExprKind::Var(var) => {
                let id = self.resolve(var, span)?;
                Some(self.decls[id].value_type())
            }

            ExprKind::Subscript { var, index } => {
                let id = self.resolve(var, span)?;
                self.bind_expr(index)?;
                Some(self.decls[id].ty)
            }

            ExprKind::Call { callee, args } => {
                let id = self.resolve(callee, span)?;
                for arg in args.iter_mut() {
                    self.bind_expr(arg)?;
                }
                Some(self.decls[id].ty)
            }

            ExprKind::Assign { target, value } => {
                self.bind_expr(target)?;
                self.bind_expr(value)?;
                let ty = target.resolved_type().ok_or_else(|| {
                    CompileError::internal("assignment target left unresolved")
                })?;
                Some(ty)
            }

            ExprKind::Binary { left, right, .. } => {
                self.bind_expr(left)?;
                self.bind_expr(right)?;
                None
            }

            ExprKind::IntLiteral(_) => None,
        };

        if let Some(ty) = resolved {
            expr.set_resolved_type(ty);
        }
        Ok(())
    }

    fn resolve(&self, var: &mut VarRef, span: Span) -> CompileResult<DeclId> {
        let id = self.symbols.lookup(&var.name, span)?;
        var.binding = Binding::Resolved(id);
        tracing::trace!(name = %var.name, depth = ?self.decls[id].depth, "resolved identifier");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::Parser;

    fn bind(source: &str) -> CompileResult<Program> {
        let mut program = Parser::from_source(source).parse()?;
        ScopeBinder::bind(&mut program)?;
        Ok(program)
    }

    fn body<'a>(program: &'a Program, name: &str) -> &'a CompoundStmt {
        &program.function(name).unwrap().body
    }

    fn expr_of(stmt: &Stmt) -> &Expr {
        match &stmt.kind {
            StmtKind::Expr(Some(expr)) | StmtKind::Return(Some(expr)) => expr,
            other => panic!("expected a statement with an expression, got {other:?}"),
        }
    }

    fn binding(expr: &Expr) -> DeclId {
        expr.identifier().unwrap().binding.decl().unwrap()
    }

    #[test]
    fn test_resolves_uses_to_local() {
        let program = bind("int main(void) { int x; x = 2 + 3; return x; }").unwrap();
        let body = body(&program, "main");
        let local = body.locals[0];

        let ExprKind::Assign { target, value } = &expr_of(&body.statements[0]).kind else {
            panic!("expected assignment");
        };
        assert_eq!(binding(target), local);
        assert_eq!(target.resolved_type(), Some(ValueType::Int));
        assert_eq!(value.resolved_type(), Some(ValueType::Int));

        let ret = expr_of(&body.statements[1]);
        assert_eq!(binding(ret), local);
        assert_eq!(ret.resolved_type(), Some(ValueType::Int));
    }

    #[test]
    fn test_declaration_depths() {
        let program = bind("int g; int f(int p) { int l; { int n; } return p; } void main(void) { }").unwrap();

        let depth = |name: &str| {
            program
                .decls
                .iter()
                .find(|(_, d)| d.name == name)
                .and_then(|(_, d)| d.depth)
        };
        assert_eq!(depth("g"), Some(0));
        assert_eq!(depth("f"), Some(0));
        assert_eq!(depth("p"), Some(1));
        assert_eq!(depth("l"), Some(1));
        assert_eq!(depth("n"), Some(2));
        assert_eq!(depth("input"), Some(0));
    }

    #[test]
    fn test_inner_block_shadows_outer() {
        let source = "
            void main(void) {
                int x;
                { void x; x; }
                x;
            }";
        let program = bind(source).unwrap();
        let body = body(&program, "main");
        let outer = body.locals[0];

        let StmtKind::Compound(inner) = &body.statements[0].kind else {
            panic!("expected block");
        };
        let inner_use = expr_of(&inner.statements[0]);
        assert_eq!(binding(inner_use), inner.locals[0]);
        assert_eq!(inner_use.resolved_type(), Some(ValueType::Void));

        let outer_use = expr_of(&body.statements[1]);
        assert_eq!(binding(outer_use), outer);
        assert_eq!(outer_use.resolved_type(), Some(ValueType::Int));
    }

    #[test]
    fn test_parameter_and_local_share_scope() {
        let err = bind("void f(int a) { int a; } void main(void) { }").unwrap_err();
        assert!(matches!(err, CompileError::Redeclared { ref name, .. } if name == "a"));
    }

    #[test]
    fn test_function_may_shadow_global() {
        assert!(bind("int x; void main(void) { int x; x = 1; }").is_ok());
    }

    #[test]
    fn test_same_scope_redeclaration() {
        let err = bind("int x; int x; void main(void) { }").unwrap_err();
        assert!(matches!(err, CompileError::Redeclared { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_undeclared_use() {
        let err = bind("void main(void) { x = 1; }").unwrap_err();
        match err {
            CompileError::Undeclared { name, span } => {
                assert_eq!(name, "x");
                assert_eq!((span.line, span.column), (1, 19));
            }
            other => panic!("expected undeclared error, got {other:?}"),
        }
    }

    #[test]
    fn test_block_locals_do_not_leak() {
        let err = bind("void main(void) { { int y; } y = 1; }").unwrap_err();
        assert!(matches!(err, CompileError::Undeclared { ref name, .. } if name == "y"));
    }

    #[test]
    fn test_use_before_declaration_is_undeclared() {
        let err = bind("void main(void) { f(); } void f(void) { }").unwrap_err();
        assert!(matches!(err, CompileError::Undeclared { ref name, .. } if name == "f"));
    }

    #[test]
    fn test_recursive_call_resolves() {
        let program = bind("int f(int n) { return f(n - 1); } void main(void) { }").unwrap();
        let f = program.function("f").unwrap();

        let call = expr_of(&f.body.statements[0]);
        assert_eq!(binding(call), f.id);
        assert_eq!(call.resolved_type(), Some(ValueType::Int));
    }

    #[test]
    fn test_array_types() {
        let source = "
            int g(int b[]) { return b[0]; }
            void main(void) { int a[3]; a[0] = g(a); }";
        let program = bind(source).unwrap();

        let g = body(&program, "g");
        assert_eq!(expr_of(&g.statements[0]).resolved_type(), Some(ValueType::Int));

        let main = body(&program, "main");
        let ExprKind::Assign { target, value } = &expr_of(&main.statements[0]).kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.resolved_type(), Some(ValueType::Int));
        let ExprKind::Call { args, .. } = &value.kind else {
            panic!("expected call");
        };
        assert_eq!(args[0].resolved_type(), Some(ValueType::Array));
    }

    #[test]
    fn test_builtins_resolve() {
        let program = bind("void main(void) { int x; x = input(0); output(x); }").unwrap();
        let main = body(&program, "main");

        let call = expr_of(&main.statements[1]);
        let decl = program.decl(binding(call));
        assert_eq!(decl.name, "output");
        assert!(decl.is_function());
        assert_eq!(call.resolved_type(), Some(ValueType::Void));
    }

    #[test]
    fn test_single_statement_arm_has_own_scope() {
        // The while body is scoped even though it is not a block
        let source = "void main(void) { int i; while (i) i = i - 1; if (i) i = 0; else i = 1; }";
        let program = bind(source).unwrap();
        let main = body(&program, "main");

        let StmtKind::While { body, .. } = &main.statements[0].kind else {
            panic!("expected while");
        };
        let ExprKind::Assign { target, .. } = &expr_of(body.as_ref()).kind else {
            panic!("expected assignment");
        };
        assert_eq!(binding(target), main.locals[0]);
    }
}
