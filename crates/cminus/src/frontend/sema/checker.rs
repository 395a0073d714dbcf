//! Type checking: the second semantic pass
//!
//! Runs on a fully bound tree and stops at the first violation, in source
//! order.

use crate::common::{CompileError, CompileResult, Span};
use crate::frontend::ast::*;

/// Which `return` statements count when checking a function's returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnCheck {
    /// Only statements directly in the function body
    #[default]
    Direct,
    /// Also returns nested in blocks, branches and loop bodies
    Nested,
}

pub struct TypeChecker<'p> {
    program: &'p Program,
    return_check: ReturnCheck,
    /// Location of `main` once it has been seen
    main: Option<Span>,
}

/// A `return` statement and the value it returns, if any
struct ReturnSite<'p> {
    span: Span,
    value: Option<&'p Expr>,
}

impl<'p> TypeChecker<'p> {
    #[tracing::instrument(name = "check", skip_all, fields(return_check = ?return_check))]
    pub fn check(program: &'p Program, return_check: ReturnCheck) -> CompileResult<()> {
        let mut checker = Self {
            program,
            return_check,
            main: None,
        };

        for declaration in &program.declarations {
            match declaration {
                Declaration::Variable(id) => checker.check_declaration(*id)?,
                Declaration::Function(func) => checker.check_function(func)?,
            }
        }

        if checker.main.is_none() {
            return Err(CompileError::semantic(
                "\"main\" function was never declared",
                Span::default(),
            ));
        }

        tracing::debug!("type checking complete");
        Ok(())
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn check_declaration(&self, id: DeclId) -> CompileResult<()> {
        let decl = self.program.decl(id);
        if decl.ty.is_void() {
            return Err(CompileError::semantic(
                format!("Declared {} \"{}\" as void", decl.kind_name(), decl.name),
                decl.span,
            ));
        }
        Ok(())
    }

    fn check_function(&mut self, func: &'p FunctionDecl) -> CompileResult<()> {
        let decl = self.program.decl(func.id);

        self.check_returns(func, decl)?;

        if let Some(main) = self.main {
            return Err(CompileError::semantic_with_decl(
                format!("\"main\" function was not declared last (found \"{}\" after it)", decl.name),
                decl.span,
                main,
            ));
        }
        if decl.name == "main" {
            self.main = Some(decl.span);
        }

        for &param in decl.params() {
            self.check_declaration(param)?;
        }
        self.check_compound(&func.body)
    }

    fn check_returns(&self, func: &'p FunctionDecl, decl: &Decl) -> CompileResult<()> {
        let mut returns = Vec::new();
        collect_returns(&func.body.statements, self.return_check, &mut returns);

        if decl.ty.is_void() {
            if let Some(site) = returns.iter().find(|site| site.value.is_some()) {
                return Err(CompileError::semantic_with_decl(
                    "Returning a value from a void function",
                    site.span,
                    decl.span,
                ));
            }
            return Ok(());
        }

        if returns.is_empty() {
            return Err(CompileError::semantic(
                "Not returning a value from a non-void function",
                decl.span,
            ));
        }

        for site in &returns {
            let Some(value) = site.value else {
                return Err(CompileError::semantic_with_decl(
                    "Not returning a value from a non-void function",
                    site.span,
                    decl.span,
                ));
            };
            match resolved(value)? {
                ValueType::Int => {}
                ValueType::Void => {
                    return Err(CompileError::semantic_with_decl(
                        "Returning a void value from a non-void function",
                        value.span,
                        decl.span,
                    ));
                }
                ValueType::Array => {
                    return Err(CompileError::semantic_with_decl(
                        "Returning an array from a non-void function",
                        value.span,
                        decl.span,
                    ));
                }
            }
        }

        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_compound(&self, block: &CompoundStmt) -> CompileResult<()> {
        for &local in &block.locals {
            self.check_declaration(local)?;
        }
        for stmt in &block.statements {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&self, stmt: &Stmt) -> CompileResult<()> {
        match &stmt.kind {
            StmtKind::Compound(block) => self.check_compound(block),

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_expr(condition)?;
                self.check_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }

            StmtKind::While { condition, body } => {
                self.check_expr(condition)?;
                self.check_stmt(body)
            }

            StmtKind::Return(value) | StmtKind::Expr(value) => match value {
                Some(expr) => self.check_expr(expr),
                None => Ok(()),
            },
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn check_expr(&self, expr: &Expr) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Assign { target, value } => {
                self.check_assignment_target(target)?;
                self.check_expr(target)?;
                self.check_expr(value)
            }

            ExprKind::Var(_) | ExprKind::IntLiteral(_) => Ok(()),

            ExprKind::Subscript { var, index } => {
                let decl = self.bound(var)?;
                if !decl.is_array() {
                    return Err(CompileError::semantic_with_decl(
                        format!("Subscripting \"{}\", which is not an array", var.name),
                        expr.span,
                        decl.span,
                    ));
                }
                self.check_expr(index)
            }

            ExprKind::Call { callee, args } => {
                self.check_call(callee, args, expr.span)?;
                for arg in args {
                    self.check_expr(arg)?;
                }
                Ok(())
            }

            ExprKind::Binary { op, left, right } => {
                for operand in [left, right] {
                    let ty = resolved(operand)?;
                    if !ty.is_int() {
                        return Err(CompileError::semantic(
                            format!(
                                "An operator is being applied to a non-integer type ({} operand of '{}')",
                                ty,
                                op.as_str()
                            ),
                            operand.span,
                        ));
                    }
                }
                self.check_expr(left)?;
                self.check_expr(right)
            }
        }
    }

    fn check_assignment_target(&self, target: &Expr) -> CompileResult<()> {
        let var = target
            .identifier()
            .ok_or_else(|| CompileError::internal("assignment target is not a variable"))?;
        let decl = self.bound(var)?;

        if decl.is_function() {
            return Err(CompileError::semantic_with_decl(
                format!("Assigning a value to the function \"{}\"", var.name),
                target.span,
                decl.span,
            ));
        }
        if matches!(target.kind, ExprKind::Var(_)) && decl.is_array() {
            return Err(CompileError::semantic_with_decl(
                format!("Assigning a value to \"{}\" with no subscript", var.name),
                target.span,
                decl.span,
            ));
        }
        Ok(())
    }

    fn check_call(&self, callee: &VarRef, args: &[Expr], span: Span) -> CompileResult<()> {
        let decl = self.bound(callee)?;
        if decl.is_builtin() {
            if args.len() != 1 {
                return Err(CompileError::semantic(
                    format!(
                        "\"{}\" takes exactly one argument, but {} were given",
                        callee.name,
                        args.len()
                    ),
                    span,
                ));
            }
            return Ok(());
        }

        if !decl.is_function() {
            return Err(CompileError::semantic_with_decl(
                format!("\"{}\" is not a function", callee.name),
                span,
                decl.span,
            ));
        }

        let params = decl.params();
        if params.len() != args.len() {
            return Err(CompileError::semantic_with_decl(
                format!(
                    "Number of arguments does not match the declaration of \"{}\": expected {}, found {}",
                    callee.name,
                    params.len(),
                    args.len()
                ),
                span,
                decl.span,
            ));
        }

        for (position, (arg, &param)) in args.iter().zip(params).enumerate() {
            let param = self.program.decl(param);
            let expected = param.value_type();
            let found = resolved(arg)?;
            if expected != found {
                return Err(CompileError::semantic_with_decl(
                    format!(
                        "Argument {} of \"{}\" has type {}, but parameter \"{}\" is declared {}",
                        position + 1,
                        callee.name,
                        found,
                        param.name,
                        expected
                    ),
                    arg.span,
                    param.span,
                ));
            }
        }

        Ok(())
    }

    fn bound(&self, var: &VarRef) -> CompileResult<&'p Decl> {
        var.binding
            .decl()
            .map(|id| self.program.decl(id))
            .ok_or_else(|| CompileError::internal(format!("identifier '{}' was never bound", var.name)))
    }
}

fn resolved(expr: &Expr) -> CompileResult<ValueType> {
    expr.resolved_type()
        .ok_or_else(|| CompileError::internal("expression type was never resolved"))
}

fn collect_returns<'p>(stmts: &'p [Stmt], mode: ReturnCheck, out: &mut Vec<ReturnSite<'p>>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Return(value) => out.push(ReturnSite {
                span: stmt.span,
                value: value.as_ref(),
            }),
            _ if mode == ReturnCheck::Direct => {}
            StmtKind::Compound(block) => collect_returns(&block.statements, mode, out),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_returns(std::slice::from_ref(&**then_branch), mode, out);
                if let Some(else_branch) = else_branch {
                    collect_returns(std::slice::from_ref(&**else_branch), mode, out);
                }
            }
            StmtKind::While { body, .. } => {
                collect_returns(std::slice::from_ref(&**body), mode, out);
            }
            StmtKind::Expr(_) => {}
        }
    }
}
