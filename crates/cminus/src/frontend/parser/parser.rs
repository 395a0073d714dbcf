//! Recursive descent parser for C-
//!
//! ```text
//! program        -> declaration { declaration }
//! declaration    -> type-spec ID ( var-decl | fun-decl )
//! var-decl       -> [ '[' NUM ']' ] ';'
//! fun-decl       -> '(' params ')' compound-stmt
//! params         -> 'void' [ ID param-list ] | 'int' ID param-list
//! param-list     -> [ '[' ']' ] { ',' param }
//! param          -> type-spec ID [ '[' ']' ]
//! compound-stmt  -> '{' { type-spec ID var-decl } { statement } '}'
//! statement      -> compound-stmt | if-stmt | while-stmt | return-stmt | expr-stmt
//! expr-stmt      -> [ expression ] ';'
//! if-stmt        -> 'if' '(' expression ')' statement [ 'else' statement ]
//! while-stmt     -> 'while' '(' expression ')' statement
//! return-stmt    -> 'return' [ expression ] ';'
//! expression     -> var '=' expression | simple-expr
//! var            -> ID [ '[' expression ']' ]
//! simple-expr    -> additive [ relop additive ]
//! additive       -> term { addop term }
//! term           -> factor { mulop factor }
//! factor         -> '(' expression ')' | ID [ '[' expression ']' ] | call | NUM
//! call           -> ID '(' [ expression { ',' expression } ] ')'
//! ```
//!
//! Every production dispatches on the current token, except `expression`:
//! an identifier there may start an assignment target or an ordinary
//! operand, so the parser reads a `var`, looks for `=`, and rewinds the
//! cursor to the identifier when there is none. The `var` read during the
//! lookahead is kept and handed to `factor` when it reaches the same
//! identifier, so nested subscripts are parsed once.
//!
//! Statements and expressions may nest at most [`MAX_NESTING`] levels deep.

use crate::common::{CompileError, CompileResult};
use crate::frontend::ast::*;
use crate::frontend::lexer::{Lexer, Token, TokenKind};

/// Deepest nesting of statements and expressions the parser accepts
pub const MAX_NESTING: usize = 128;

/// Recursive descent parser over a fully scanned token sequence
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    decls: DeclArena,
    /// `var` read by the assignment lookahead: start position, tree, end position
    rewound: Option<(usize, Expr, usize)>,
    depth: usize,
}

impl Parser {
    /// Create a parser over `tokens`; a missing trailing `Eof` is supplied
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::eof(span));
        }

        Self {
            tokens,
            pos: 0,
            decls: DeclArena::new(),
            rewound: None,
            depth: 0,
        }
    }

    /// Scan `source` and create a parser over its tokens
    pub fn from_source(source: &str) -> Self {
        Self::new(Lexer::new(source).tokenize_all())
    }

    /// Parse a complete program
    #[tracing::instrument(name = "parse", skip_all, fields(token_count = self.tokens.len()))]
    pub fn parse(mut self) -> CompileResult<Program> {
        let mut declarations = vec![self.parse_declaration()?];

        while !self.at_end() {
            declarations.push(self.parse_declaration()?);
        }

        tracing::debug!(declarations = declarations.len(), "parsed program");
        Ok(Program::new(declarations, self.decls))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, production: &'static str, kind: TokenKind) -> CompileResult<Token> {
        self.expect_one_of(production, &[kind])
    }

    fn expect_one_of(
        &mut self,
        production: &'static str,
        kinds: &[TokenKind],
    ) -> CompileResult<Token> {
        if kinds.contains(&self.current().kind) {
            Ok(self.advance())
        } else {
            Err(self.error(production, kinds))
        }
    }

    /// Enter one level of nesting; balanced by `ascend` on success
    fn descend(&mut self, production: &'static str) -> CompileResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(CompileError::too_deep(production, MAX_NESTING, self.current().span));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self, levels: usize) {
        self.depth -= levels;
    }

    fn error(&self, production: &'static str, expected: &[TokenKind]) -> CompileError {
        let token = self.current();
        CompileError::syntax(
            production,
            token.describe(),
            expected.iter().map(ToString::to_string).collect(),
            token.span,
        )
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_declaration(&mut self) -> CompileResult<Declaration> {
        let ty = self.parse_type_specifier()?;
        let name = self.expect("declaration", TokenKind::Identifier)?;

        match self.current().kind {
            TokenKind::LBracket | TokenKind::Semi => {
                Ok(Declaration::Variable(self.parse_var_declaration(ty, name)?))
            }
            TokenKind::LParen => {
                Ok(Declaration::Function(self.parse_function_declaration(ty, name)?))
            }
            _ => Err(self.error(
                "declaration",
                &[TokenKind::LBracket, TokenKind::Semi, TokenKind::LParen],
            )),
        }
    }

    fn parse_type_specifier(&mut self) -> CompileResult<ValueType> {
        let token = self.expect_one_of("type-specifier", &[TokenKind::Int, TokenKind::Void])?;
        ValueType::from_specifier(token.kind).ok_or_else(|| {
            CompileError::internal(format!("{} is not a type specifier", token.kind))
        })
    }

    fn parse_var_declaration(&mut self, ty: ValueType, name: Token) -> CompileResult<DeclId> {
        let decl = if self.match_token(TokenKind::LBracket) {
            let size = self.expect("variable-declaration", TokenKind::Number)?;
            self.expect("variable-declaration", TokenKind::RBracket)?;
            let size = size
                .value
                .and_then(|v| usize::try_from(v).ok())
                .ok_or_else(|| CompileError::internal("array size token without a value"))?;
            Decl::array(name.lexeme, ty, size, name.span)
        } else {
            Decl::variable(name.lexeme, ty, name.span)
        };

        self.expect("variable-declaration", TokenKind::Semi)?;
        Ok(self.decls.alloc(decl))
    }

    fn parse_function_declaration(
        &mut self,
        ty: ValueType,
        name: Token,
    ) -> CompileResult<FunctionDecl> {
        self.expect("function-declaration", TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect("function-declaration", TokenKind::RParen)?;
        let body = self.parse_compound_statement()?;

        let id = self.decls.alloc(Decl::function(name.lexeme, ty, params, name.span));
        Ok(FunctionDecl::new(id, body))
    }

    fn parse_params(&mut self) -> CompileResult<Vec<DeclId>> {
        match self.current().kind {
            // `void` alone means no parameters; `void x` is a (void) parameter
            TokenKind::Void => {
                self.advance();
                if self.check(TokenKind::Identifier) {
                    let name = self.advance();
                    self.parse_param_list(ValueType::Void, name)
                } else {
                    Ok(Vec::new())
                }
            }
            TokenKind::Int => {
                self.advance();
                let name = self.expect("params", TokenKind::Identifier)?;
                self.parse_param_list(ValueType::Int, name)
            }
            _ => Err(self.error("params", &[TokenKind::Int, TokenKind::Void])),
        }
    }

    fn parse_param_list(&mut self, ty: ValueType, first: Token) -> CompileResult<Vec<DeclId>> {
        let mut params = vec![self.parse_param_suffix("param-list", ty, first)?];

        while self.match_token(TokenKind::Comma) {
            let ty = self.parse_type_specifier()?;
            let name = self.expect("param", TokenKind::Identifier)?;
            params.push(self.parse_param_suffix("param", ty, name)?);
        }

        Ok(params)
    }

    fn parse_param_suffix(
        &mut self,
        production: &'static str,
        ty: ValueType,
        name: Token,
    ) -> CompileResult<DeclId> {
        let is_array = if self.match_token(TokenKind::LBracket) {
            self.expect(production, TokenKind::RBracket)?;
            true
        } else {
            false
        };

        Ok(self.decls.alloc(Decl::parameter(name.lexeme, ty, is_array, name.span)))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_compound_statement(&mut self) -> CompileResult<CompoundStmt> {
        let start = self.expect("compound-statement", TokenKind::LBrace)?.span;

        let mut locals = Vec::new();
        while self.current().kind.is_type_specifier() {
            let ty = self.parse_type_specifier()?;
            let name = self.expect("local-declaration", TokenKind::Identifier)?;
            locals.push(self.parse_var_declaration(ty, name)?);
        }

        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_end() {
            statements.push(self.parse_statement()?);
        }

        let end = self.expect("compound-statement", TokenKind::RBrace)?.span;
        Ok(CompoundStmt::new(locals, statements, start.merge(end)))
    }

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        self.descend("statement")?;
        let stmt = self.parse_statement_kind()?;
        self.ascend(1);
        Ok(stmt)
    }

    fn parse_statement_kind(&mut self) -> CompileResult<Stmt> {
        match self.current().kind {
            TokenKind::LBrace => {
                let block = self.parse_compound_statement()?;
                let span = block.span;
                Ok(Stmt::new(StmtKind::Compound(block), span))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    /// `[ expression ] ';'`, shared by expression and return statements
    fn parse_optional_expression(
        &mut self,
        production: &'static str,
    ) -> CompileResult<Option<Expr>> {
        let expr = if self.current().kind.can_start_expression() {
            Some(self.parse_expression()?)
        } else if !self.check(TokenKind::Semi) {
            return Err(self.error(
                production,
                &[TokenKind::Identifier, TokenKind::Number, TokenKind::LParen, TokenKind::Semi],
            ));
        } else {
            None
        };

        self.expect(production, TokenKind::Semi)?;
        Ok(expr)
    }

    fn parse_expression_statement(&mut self) -> CompileResult<Stmt> {
        let span = self.current().span;
        let expr = self.parse_optional_expression("expression-statement")?;
        Ok(Stmt::new(StmtKind::Expr(expr), span))
    }

    fn parse_if_statement(&mut self) -> CompileResult<Stmt> {
        let span = self.expect("selection-statement", TokenKind::If)?.span;
        self.expect("selection-statement", TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect("selection-statement", TokenKind::RParen)?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_token(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    fn parse_while_statement(&mut self) -> CompileResult<Stmt> {
        let span = self.expect("iteration-statement", TokenKind::While)?.span;
        self.expect("iteration-statement", TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect("iteration-statement", TokenKind::RParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::new(StmtKind::While { condition, body }, span))
    }

    fn parse_return_statement(&mut self) -> CompileResult<Stmt> {
        let span = self.expect("return-statement", TokenKind::Return)?.span;
        let expr = self.parse_optional_expression("return-statement")?;
        Ok(Stmt::new(StmtKind::Return(expr), span))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression(&mut self) -> CompileResult<Expr> {
        self.descend("expression")?;
        let expr = self.parse_assignment_or_simple()?;
        self.ascend(1);
        Ok(expr)
    }

    fn parse_assignment_or_simple(&mut self) -> CompileResult<Expr> {
        if self.check(TokenKind::Identifier) {
            let checkpoint = self.pos;
            let name = self.advance();
            let provisional = ValueType::provisional(name.kind);
            let target = self.parse_var(name)?;

            if self.check(TokenKind::Eq) {
                let op = self.advance();
                let value = self.parse_expression()?;
                return Ok(Expr::assign(target, value, op.span, provisional));
            }

            // Not an assignment: rewind to the identifier. A call is reparsed
            // from scratch; anything else reuses the `var` just read.
            if self.tokens[checkpoint + 1].kind != TokenKind::LParen {
                self.rewound = Some((checkpoint, target, self.pos));
            }
            self.pos = checkpoint;
        }

        self.parse_simple_expression()
    }

    fn parse_var(&mut self, name: Token) -> CompileResult<Expr> {
        let provisional = ValueType::provisional(name.kind);
        let var = VarRef::new(name.lexeme);

        if self.match_token(TokenKind::LBracket) {
            let index = self.parse_expression()?;
            self.expect("var", TokenKind::RBracket)?;
            Ok(Expr::subscript(var, index, name.span, provisional))
        } else {
            Ok(Expr::var(var, name.span, provisional))
        }
    }

    fn parse_simple_expression(&mut self) -> CompileResult<Expr> {
        let left = self.parse_additive_expression()?;

        // Relational operators do not chain
        if self.current().kind.is_relational_op() {
            let token = self.advance();
            let op = binary_op(token.kind).ok_or_else(|| unknown_operator(&token))?;
            let right = self.parse_additive_expression()?;
            return Ok(Expr::binary(op, left, right, token.span));
        }

        Ok(left)
    }

    fn parse_additive_expression(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_term()?;
        let mut levels = 0;

        // Every operator wraps the tree built so far
        while self.current().kind.is_additive_op() {
            self.descend("additive-expression")?;
            levels += 1;
            let token = self.advance();
            let op = binary_op(token.kind).ok_or_else(|| unknown_operator(&token))?;
            let right = self.parse_term()?;
            left = Expr::binary(op, left, right, token.span);
        }

        self.ascend(levels);
        Ok(left)
    }

    fn parse_term(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_factor()?;
        let mut levels = 0;

        while self.current().kind.is_multiplicative_op() {
            self.descend("term")?;
            levels += 1;
            let token = self.advance();
            let op = binary_op(token.kind).ok_or_else(|| unknown_operator(&token))?;
            let right = self.parse_factor()?;
            left = Expr::binary(op, left, right, token.span);
        }

        self.ascend(levels);
        Ok(left)
    }

    fn parse_factor(&mut self) -> CompileResult<Expr> {
        match self.current().kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect("factor", TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Identifier => {
                if let Some(var) = self.take_rewound() {
                    return Ok(var);
                }
                let name = self.advance();
                if self.check(TokenKind::LParen) {
                    self.parse_call(name)
                } else {
                    self.parse_var(name)
                }
            }
            TokenKind::Number => {
                let token = self.advance();
                let value = token
                    .value
                    .ok_or_else(|| CompileError::internal("number token without a value"))?;
                Ok(Expr::int_literal(value, token.span))
            }
            _ => Err(self.error(
                "factor",
                &[TokenKind::LParen, TokenKind::Identifier, TokenKind::Number],
            )),
        }
    }

    /// The `var` left by the assignment lookahead, if it starts at the cursor
    fn take_rewound(&mut self) -> Option<Expr> {
        match self.rewound.take() {
            Some((start, var, end)) if start == self.pos => {
                self.pos = end;
                Some(var)
            }
            _ => None,
        }
    }

    fn parse_call(&mut self, name: Token) -> CompileResult<Expr> {
        let provisional = ValueType::provisional(name.kind);
        self.expect("call", TokenKind::LParen)?;
        let args = self.parse_argument_list()?;
        self.expect("call", TokenKind::RParen)?;

        Ok(Expr::call(VarRef::new(name.lexeme), args, name.span, provisional))
    }

    fn parse_argument_list(&mut self) -> CompileResult<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.current().kind.can_start_expression() {
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(args)
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Sub),
        TokenKind::Star => Some(BinaryOp::Mul),
        TokenKind::Slash => Some(BinaryOp::Div),
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::Le),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::Ge),
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::Ne),
        _ => None,
    }
}

fn unknown_operator(token: &Token) -> CompileError {
    CompileError::internal(format!("{} is not a binary operator", token.kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::from_source(source).parse().unwrap()
    }

    fn parse_err(source: &str) -> CompileError {
        Parser::from_source(source).parse().unwrap_err()
    }

    /// First statement of the body of the only (or first) function
    fn first_stmt(program: &Program) -> &Stmt {
        &program.functions().next().unwrap().body.statements[0]
    }

    fn first_expr(program: &Program) -> &Expr {
        match &first_stmt(program).kind {
            StmtKind::Expr(Some(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    fn wrap(body: &str) -> String {
        format!("void main(void) {{ int x; int y; int a[4]; {body} }}")
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("int main(void) { return 0; }");

        assert_eq!(program.declarations.len(), 1);
        let main = program.function("main").unwrap();
        let decl = program.decl(main.id);
        assert_eq!(decl.ty, ValueType::Int);
        assert!(decl.params().is_empty());
        assert!(main.body.locals.is_empty());
        assert!(matches!(
            &main.body.statements[0].kind,
            StmtKind::Return(Some(Expr { kind: ExprKind::IntLiteral(0), .. }))
        ));
    }

    #[test]
    fn test_parse_global_declarations() {
        let program = parse("int x; int a[10]; void main(void) { }");

        assert_eq!(program.declarations.len(), 3);
        let x = program.decl(program.declarations[0].id());
        let a = program.decl(program.declarations[1].id());
        assert_eq!(x.kind, DeclKind::Variable);
        assert_eq!(a.kind, DeclKind::Array { size: 10 });
        assert_eq!(a.ty, ValueType::Int);
        assert!(matches!(program.declarations[2], Declaration::Function(_)));
    }

    #[test]
    fn test_parse_params() {
        let program = parse("int f(int a, int b[], void c) { return a; }");
        let f = program.function("f").unwrap();
        let params: Vec<_> = program
            .decl(f.id)
            .params()
            .iter()
            .map(|&id| program.decl(id))
            .collect();

        assert_eq!(params.len(), 3);
        assert_eq!(params[0].kind, DeclKind::Parameter { is_array: false });
        assert_eq!(params[1].kind, DeclKind::Parameter { is_array: true });
        assert_eq!(params[2].ty, ValueType::Void);
    }

    #[test]
    fn test_parse_void_named_param() {
        let program = parse("void f(void x) { }");
        let f = program.function("f").unwrap();
        assert_eq!(program.decl(f.id).params().len(), 1);
    }

    #[test]
    fn test_parse_locals_before_statements() {
        let program = parse("void main(void) { int x; int y[2]; x = 1; ; }");
        let main = program.function("main").unwrap();

        assert_eq!(main.body.locals.len(), 2);
        assert_eq!(main.body.statements.len(), 2);
        assert!(matches!(main.body.statements[1].kind, StmtKind::Expr(None)));
    }

    #[test]
    fn test_parse_assignment_is_right_associative() {
        let program = parse(&wrap("x = y = 3;"));

        let ExprKind::Assign { target, value } = &first_expr(&program).kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.identifier().unwrap().name, "x");
        let ExprKind::Assign { target, value } = &value.kind else {
            panic!("expected nested assignment");
        };
        assert_eq!(target.identifier().unwrap().name, "y");
        assert!(matches!(value.kind, ExprKind::IntLiteral(3)));
    }

    #[test]
    fn test_parse_subscript_assignment() {
        let program = parse(&wrap("a[x + 1] = 2;"));

        let ExprKind::Assign { target, .. } = &first_expr(&program).kind else {
            panic!("expected assignment");
        };
        let ExprKind::Subscript { var, index } = &target.kind else {
            panic!("expected subscript target");
        };
        assert_eq!(var.name, "a");
        assert!(matches!(index.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_rewinds_when_not_an_assignment() {
        let program = parse(&wrap("a[x] + y;"));

        let ExprKind::Binary { op, left, right } = &first_expr(&program).kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(left.kind, ExprKind::Subscript { .. }));
        assert!(matches!(right.kind, ExprKind::Var(_)));
    }

    #[test]
    fn test_rewinds_to_call() {
        let program = parse("int f(int v) { return v; } void main(void) { f(1) < 2; }");
        let main = program.function("main").unwrap();

        let StmtKind::Expr(Some(expr)) = &main.body.statements[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Binary { op, left, .. } = &expr.kind else {
            panic!("expected relational expression");
        };
        assert_eq!(*op, BinaryOp::Lt);
        let ExprKind::Call { callee, args } = &left.kind else {
            panic!("expected call");
        };
        assert_eq!(callee.name, "f");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_precedence_and_associativity() {
        let program = parse(&wrap("x - 1 - 2 * y;"));

        // (x - 1) - (2 * y)
        let ExprKind::Binary { op, left, right } = &first_expr(&program).kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Sub);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_parenthesized_expression() {
        let program = parse(&wrap("(x + 1) * 2;"));

        let ExprKind::Binary { op, left, .. } = &first_expr(&program).kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Mul);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Add, .. }));
    }

    #[test]
    fn test_relational_operators_do_not_chain() {
        let err = parse_err(&wrap("x < y < 3;"));
        assert!(matches!(
            err,
            CompileError::Syntax { production: "expression-statement", ref found, .. } if found == "<"
        ));
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let program = parse(&wrap("if (x) if (y) x = 1; else x = 2;"));

        let StmtKind::If { then_branch, else_branch, .. } = &first_stmt(&program).kind else {
            panic!("expected if");
        };
        assert!(else_branch.is_none());
        assert!(matches!(
            then_branch.kind,
            StmtKind::If { else_branch: Some(_), .. }
        ));
    }

    #[test]
    fn test_while_and_return() {
        let program = parse("void main(void) { int i; while (i < 10) { i = i + 1; } return; }");
        let main = program.function("main").unwrap();

        assert!(matches!(main.body.statements[0].kind, StmtKind::While { .. }));
        assert!(matches!(main.body.statements[1].kind, StmtKind::Return(None)));
    }

    #[test]
    fn test_identifier_types_are_provisional() {
        let program = parse(&wrap("x = 1;"));
        let expr = first_expr(&program);

        assert_eq!(expr.ty, TypeState::Provisional(ValueType::Void));
        assert_eq!(expr.resolved_type(), None);
        let ExprKind::Assign { value, .. } = &expr.kind else {
            panic!("expected assignment");
        };
        assert_eq!(value.resolved_type(), Some(ValueType::Int));
    }

    #[test]
    fn test_identifiers_start_unbound() {
        let program = parse(&wrap("x = y;"));
        let ExprKind::Assign { target, value } = &first_expr(&program).kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.identifier().unwrap().binding, Binding::Unresolved);
        assert_eq!(value.identifier().unwrap().binding, Binding::Unresolved);
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_err("int x");
        match err {
            CompileError::Syntax { production, found, expected, .. } => {
                assert_eq!(production, "declaration");
                assert_eq!(found, "end of input");
                assert_eq!(expected, vec!["'['", "';'", "'('"]);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_program_is_rejected() {
        let err = parse_err("");
        assert!(matches!(err, CompileError::Syntax { production: "type-specifier", .. }));

        let err = parse_err("   $ int x;");
        assert!(matches!(err, CompileError::Syntax { production: "type-specifier", .. }));
    }

    #[test]
    fn test_declaration_after_statement_is_rejected() {
        let err = parse_err("void main(void) { x = 1; int y; }");
        assert!(matches!(
            err,
            CompileError::Syntax { production: "expression-statement", ref found, .. } if found == "int"
        ));
    }

    #[test]
    fn test_bad_factor_reports_position() {
        let err = parse_err("void main(void) {\n  x = ;\n}");
        match err {
            CompileError::Syntax { production, span, expected, .. } => {
                assert_eq!(production, "factor");
                assert_eq!((span.line, span.column), (2, 7));
                assert_eq!(expected, vec!["'('", "identifier", "number"]);
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_lexical_error_surfaces_as_syntax_error() {
        let err = parse_err("void main(void) { x = 1 @ 2; }");
        assert!(matches!(err, CompileError::Syntax { ref found, .. } if found == "@"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_err("void main(void) { x = 1;");
        assert!(matches!(
            err,
            CompileError::Syntax { production: "compound-statement", ref found, .. } if found == "end of input"
        ));
    }

    #[test]
    fn test_missing_eof_is_supplied() {
        let mut tokens = Lexer::new("int x;").tokenize_all();
        tokens.pop();
        let program = Parser::new(tokens).parse().unwrap();
        assert_eq!(program.declarations.len(), 1);
    }

    fn nested_subscript(levels: usize) -> String {
        format!("{}0{}", "a[".repeat(levels), "]".repeat(levels))
    }

    fn subscript_depth(expr: &Expr) -> usize {
        match &expr.kind {
            ExprKind::Subscript { index, .. } => 1 + subscript_depth(index),
            _ => 0,
        }
    }

    #[test]
    fn test_deeply_nested_subscripts() {
        let source = format!("void main(void) {{ int a[1]; {}; }}", nested_subscript(40));
        let program = parse(&source);
        assert_eq!(subscript_depth(first_expr(&program)), 40);

        let source = format!(
            "void main(void) {{ int a[1]; int x; x = {} + {}; }}",
            nested_subscript(40),
            nested_subscript(40)
        );
        let program = parse(&source);
        match &first_expr(&program).kind {
            ExprKind::Assign { value, .. } => match &value.kind {
                ExprKind::Binary { left, right, .. } => {
                    assert_eq!(subscript_depth(left), 40);
                    assert_eq!(subscript_depth(right), 40);
                }
                other => panic!("expected binary value, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_subscript_assignment_target() {
        let source = format!("void main(void) {{ int a[1]; {} = 1; }}", nested_subscript(30));
        let program = parse(&source);
        match &first_expr(&program).kind {
            ExprKind::Assign { target, .. } => assert_eq!(subscript_depth(target), 30),
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_nesting_below_limit_is_accepted() {
        let source = format!("int main(void) {{ return {}1{}; }}", "(".repeat(100), ")".repeat(100));
        assert!(Parser::from_source(&source).parse().is_ok());
    }

    #[test]
    fn test_deep_parentheses_hit_nesting_limit() {
        let source = format!(
            "int main(void) {{ return {}1{}; }}",
            "(".repeat(100_000),
            ")".repeat(100_000)
        );
        match parse_err(&source) {
            CompileError::TooDeep { production, limit, span } => {
                assert_eq!(production, "expression");
                assert_eq!(limit, MAX_NESTING);
                assert_eq!(span.line, 1);
            }
            other => panic!("expected nesting error, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_blocks_hit_nesting_limit() {
        let source = format!("void main(void) {{ {}{} }}", "{".repeat(10_000), "}".repeat(10_000));
        assert!(matches!(
            parse_err(&source),
            CompileError::TooDeep { production: "statement", .. }
        ));
    }

    #[test]
    fn test_long_operator_chains_hit_nesting_limit() {
        let short = format!("int main(void) {{ return 1{}; }}", " + 1".repeat(50));
        assert!(Parser::from_source(&short).parse().is_ok());

        let long = format!("int main(void) {{ return 1{}; }}", " + 1".repeat(100_000));
        assert!(matches!(
            parse_err(&long),
            CompileError::TooDeep { production: "additive-expression", .. }
        ));

        let long = format!("int main(void) {{ return 1{}; }}", " * 1".repeat(100_000));
        assert!(matches!(parse_err(&long), CompileError::TooDeep { production: "term", .. }));
    }
}
