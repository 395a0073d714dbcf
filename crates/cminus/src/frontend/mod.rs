//! C- frontend
//!
//! This frontend handles:
//! - Lexing C- source into tokens
//! - Parsing tokens into an AST
//! - Scope binding and type checking of the AST

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::{CompileError, CompileResult, DiagnosticReporter};

pub use ast::{Program, TreeDumper};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use sema::{AnalyzerConfig, ReturnCheck, SemanticAnalyzer};

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub return_check: ReturnCheck,
}

impl FrontendConfig {
    fn analyzer(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            return_check: self.return_check,
        }
    }
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }

    /// Log `error` and emit it through the reporter
    pub fn report(&self, error: &CompileError) {
        match error.span() {
            Some(span) if !span.is_synthetic() => {
                tracing::debug!(line = span.line, column = span.column, "compilation failed");
            }
            _ => tracing::debug!("compilation failed"),
        }
        self.reporter.report_error(self.file_id, error);
    }
}

/// Lex, parse and analyze C- source
#[derive(Debug, Default)]
pub struct Frontend;

impl Frontend {
    pub fn new() -> Self {
        Self
    }

    /// Compile source code to an annotated tree.
    ///
    /// The first error is reported through the context's reporter and
    /// returned; nothing after the failing phase runs.
    #[tracing::instrument(skip_all, fields(file = %ctx.filename))]
    pub fn compile(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<Program> {
        let tokens = Lexer::new(source).tokenize_all();

        if config.dump_tokens {
            eprintln!("=== Tokens ===");
            eprint!("{}", token_listing(&tokens));
            eprintln!("=== End Tokens ===\n");
        }

        let mut program = Parser::new(tokens)
            .parse()
            .inspect_err(|e| ctx.report(e))?;

        if config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }

        SemanticAnalyzer::new(config.analyzer())
            .analyze(&mut program)
            .inspect_err(|e| ctx.report(e))?;

        Ok(program)
    }
}

/// Debug listing of `tokens`, one per line
fn token_listing(tokens: &[Token]) -> String {
    let mut output = String::new();
    for token in tokens {
        output.push_str(&format!("{:?}\n", token));
    }
    output
}
