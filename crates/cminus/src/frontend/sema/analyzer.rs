//! Semantic analyzer: scope binding followed by type checking

use super::{ReturnCheck, ScopeBinder, TypeChecker};
use crate::common::CompileResult;
use crate::frontend::ast::Program;

/// Semantic analysis options
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzerConfig {
    pub return_check: ReturnCheck,
}

/// Runs both semantic passes over a parsed program
pub struct SemanticAnalyzer {
    config: AnalyzerConfig,
}

impl SemanticAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Annotate `program` in place. Type checking only runs once every
    /// identifier has been bound.
    #[tracing::instrument(name = "analyze", skip_all)]
    pub fn analyze(&self, program: &mut Program) -> CompileResult<()> {
        ScopeBinder::bind(program)?;
        TypeChecker::check(program, self.config.return_check)?;
        tracing::info!(declarations = program.declarations.len(), "program is valid");
        Ok(())
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}
