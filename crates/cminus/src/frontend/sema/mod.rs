//! Semantic analysis module
//!
//! Two passes over the parsed tree: scope binding resolves every identifier
//! use to its declaration, then type checking enforces the static rules of
//! the language on the resolved tree.

mod symbol_table;
mod binder;
mod checker;
mod analyzer;

pub use symbol_table::{SymbolTable, BUILTINS};
pub use binder::ScopeBinder;
pub use checker::{ReturnCheck, TypeChecker};
pub use analyzer::{AnalyzerConfig, SemanticAnalyzer};
