//! Text dump of an (analyzed) program tree, one node per line

use super::*;

/// Renders a [`Program`] as a tab-indented tree.
///
/// Identifier uses print the declared type of the declaration they resolved
/// to, so the dump is meant to be taken after semantic analysis.
pub struct TreeDumper<'p> {
    program: &'p Program,
    out: String,
    depth: usize,
}

impl<'p> TreeDumper<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            out: String::new(),
            depth: 1,
        }
    }

    pub fn dump(program: &Program) -> String {
        TreeDumper::new(program).render()
    }

    pub fn render(mut self) -> String {
        let program = self.program;
        self.out.push_str("ProgramNode:\n\n");
        for decl in &program.declarations {
            match decl {
                Declaration::Variable(id) => self.dump_decl(*id),
                Declaration::Function(func) => self.dump_function(func),
            }
            self.out.push('\n');
        }
        self.out
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn dump_function(&mut self, func: &FunctionDecl) {
        let program = self.program;
        let decl = program.decl(func.id);
        self.line(format!("Function: {}: {} type", decl.name, decl.ty));
        self.nested(|d| {
            for param in decl.params() {
                d.dump_decl(*param);
            }
            d.dump_compound(&func.body);
        });
    }

    fn dump_decl(&mut self, id: DeclId) {
        let program = self.program;
        let decl = program.decl(id);
        let text = match decl.kind {
            DeclKind::Variable => format!("VariableDeclaration: {}: {} type", decl.name, decl.ty),
            DeclKind::Array { size } => {
                format!("VariableDeclaration: {}[{}]: {} type", decl.name, size, decl.ty)
            }
            DeclKind::Parameter { is_array: true } => {
                format!("Parameter: {}[]: {} type", decl.name, decl.ty)
            }
            DeclKind::Parameter { is_array: false } => {
                format!("Parameter: {}: {} type", decl.name, decl.ty)
            }
            DeclKind::Function { .. } => format!("Function: {}: {} type", decl.name, decl.ty),
        };
        self.line(text);
    }

    fn dump_compound(&mut self, block: &CompoundStmt) {
        self.line("CompoundStatement:");
        self.nested(|d| {
            for local in &block.locals {
                d.dump_decl(*local);
            }
            for stmt in &block.statements {
                d.dump_stmt(stmt);
            }
        });
    }

    fn dump_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Compound(block) => self.dump_compound(block),
            StmtKind::If { condition, then_branch, else_branch } => {
                self.line("If");
                self.nested(|d| {
                    d.dump_expr(condition);
                    d.dump_stmt(then_branch);
                    if let Some(else_branch) = else_branch {
                        d.dump_stmt(else_branch);
                    }
                });
            }
            StmtKind::While { condition, body } => {
                self.line("While");
                self.nested(|d| {
                    d.dump_expr(condition);
                    d.dump_stmt(body);
                });
            }
            StmtKind::Return(expr) => {
                self.line("Return");
                if let Some(expr) = expr {
                    self.nested(|d| d.dump_expr(expr));
                }
            }
            StmtKind::Expr(expr) => {
                self.line("ExpressionStatement:");
                if let Some(expr) = expr {
                    self.nested(|d| d.dump_expr(expr));
                }
            }
        }
    }

    fn declared_type(&self, var: &VarRef) -> String {
        match var.binding.decl() {
            Some(id) => self.program.decl(id).ty.to_string(),
            None => "Unresolved".to_string(),
        }
    }

    fn dump_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Assign { target, value } => {
                self.line("Assignment:");
                self.nested(|d| {
                    d.dump_expr(target);
                    d.dump_expr(value);
                });
            }
            ExprKind::Var(var) => {
                let ty = self.declared_type(var);
                self.line(format!("Variable: {}: {} type", var.name, ty));
            }
            ExprKind::Subscript { var, index } => {
                let ty = self.declared_type(var);
                self.line(format!("Subscript: {}: {} type", var.name, ty));
                self.nested(|d| {
                    d.line("Index:");
                    d.nested(|d| d.dump_expr(index));
                });
            }
            ExprKind::Call { callee, args } => {
                let ty = self.declared_type(callee);
                self.line(format!("FunctionCall: {}: {} type", callee.name, ty));
                if !args.is_empty() {
                    self.nested(|d| {
                        d.line("Arguments:");
                        d.nested(|d| {
                            for arg in args {
                                d.dump_expr(arg);
                            }
                        });
                    });
                }
            }
            ExprKind::Binary { op, left, right } => {
                let label = match op.class() {
                    OperatorClass::Additive => "AdditiveExpression",
                    OperatorClass::Multiplicative => "MultiplicativeExpression",
                    OperatorClass::Relational => "RelationalExpression",
                };
                self.line(format!("{}: {}", label, op.as_str()));
                self.nested(|d| {
                    d.line("Left:");
                    d.nested(|d| d.dump_expr(left));
                    d.line("Right:");
                    d.nested(|d| d.dump_expr(right));
                });
            }
            ExprKind::IntLiteral(value) => self.line(format!("Integer: {value}")),
        }
    }
}
