//! C- compiler front end
//!
//! This library parses programs written in C-, a small subset of C with
//! `int`/`void` scalars, one-dimensional arrays, functions and structured
//! control flow, and checks them for static semantic errors.
//!
//! ## Architecture
//!
//! - **Common** (`common/`): Shared infrastructure (errors, spans, diagnostics)
//! - **Frontend** (`frontend/`): Lexer, parser, AST and semantic analysis
//! - **Driver** (`driver/`): Input handling and writing the annotated tree

pub mod common;
pub mod frontend;
pub mod driver;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use frontend::{CompileContext, Frontend, FrontendConfig, ReturnCheck};
