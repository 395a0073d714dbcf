//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;

/// Compile error with source location.
///
/// Every error is fatal: the phase that raises it stops, and no later phase
/// runs on the rejected tree.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("error while parsing '{production}': encountered '{found}' ({span}), expected {}", join_expected(.expected))]
    Syntax {
        production: &'static str,
        found: String,
        expected: Vec<String>,
        span: Span,
    },

    #[error("nesting deeper than {limit} levels while parsing '{production}' ({span})")]
    TooDeep {
        production: &'static str,
        limit: usize,
        span: Span,
    },

    #[error("multiply-declared identifier '{name}' ({span})")]
    Redeclared { name: String, span: Span, previous: Span },

    #[error("undeclared identifier '{name}' ({span})")]
    Undeclared { name: String, span: Span },

    #[error("{message}{}", location(.span))]
    Semantic {
        message: String,
        span: Span,
        declared_at: Option<Span>,
    },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn syntax(
        production: &'static str,
        found: impl Into<String>,
        expected: Vec<String>,
        span: Span,
    ) -> Self {
        Self::Syntax {
            production,
            found: found.into(),
            expected,
            span,
        }
    }

    pub fn too_deep(production: &'static str, limit: usize, span: Span) -> Self {
        Self::TooDeep {
            production,
            limit,
            span,
        }
    }

    pub fn redeclared(name: impl Into<String>, span: Span, previous: Span) -> Self {
        Self::Redeclared {
            name: name.into(),
            span,
            previous,
        }
    }

    pub fn undeclared(name: impl Into<String>, span: Span) -> Self {
        Self::Undeclared {
            name: name.into(),
            span,
        }
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            span,
            declared_at: None,
        }
    }

    /// Semantic error that also points back at the offending declaration
    pub fn semantic_with_decl(message: impl Into<String>, span: Span, declared_at: Span) -> Self {
        Self::Semantic {
            message: message.into(),
            span,
            declared_at: Some(declared_at),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Primary source location, if the error has one
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Syntax { span, .. }
            | CompileError::TooDeep { span, .. }
            | CompileError::Redeclared { span, .. }
            | CompileError::Undeclared { span, .. }
            | CompileError::Semantic { span, .. } => Some(*span),
            CompileError::Internal { .. } | CompileError::Io(_) => None,
        }
    }
}

fn join_expected(expected: &[String]) -> String {
    expected.join(" or ")
}

fn location(span: &Span) -> String {
    if span.is_synthetic() {
        String::new()
    } else {
        format!(" ({span})")
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Emit a diagnostic to standard output
    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let writer = StandardStream::stdout(ColorChoice::Auto);
        self.emit(&mut writer.lock(), file_id, error);
    }

    /// Render a diagnostic without colors, for logs and tests
    pub fn render(&self, file_id: usize, error: &CompileError) -> String {
        let mut buffer = NoColor::new(Vec::new());
        self.emit(&mut buffer, file_id, error);
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }

    fn emit(&self, writer: &mut dyn WriteColor, file_id: usize, error: &CompileError) {
        let diagnostic = Self::diagnostic(file_id, error);
        let _ = term::emit(writer, &self.config, &self.files, &diagnostic);
    }

    fn diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Syntax { production, found, expected, span } => Diagnostic::error()
                .with_message(format!("Syntax error while parsing '{production}'"))
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end)
                        .with_message(format!("encountered '{found}' ({span})")),
                ])
                .with_notes(vec![format!("expected {}", join_expected(expected))]),

            CompileError::TooDeep { production, limit, span } => Diagnostic::error()
                .with_message(format!("Syntax error while parsing '{production}'"))
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end)
                        .with_message(format!("nested too deeply ({span})")),
                ])
                .with_notes(vec![format!("at most {limit} levels of nesting are supported")]),

            CompileError::Redeclared { name, span, previous } => {
                let mut labels = vec![
                    Label::primary(file_id, span.start..span.end)
                        .with_message(format!("'{name}' declared again here ({span})")),
                ];
                if !previous.is_synthetic() {
                    labels.push(
                        Label::secondary(file_id, previous.start..previous.end)
                            .with_message("first declared here"),
                    );
                }
                Diagnostic::error()
                    .with_message(format!("Multiply-declared variable {name}"))
                    .with_labels(labels)
            }

            CompileError::Undeclared { name, span } => Diagnostic::error()
                .with_message(format!("Undeclared variable {name}"))
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end)
                        .with_message(format!("not found in any enclosing scope ({span})")),
                ]),

            CompileError::Semantic { message, span, declared_at } => {
                let mut labels = Vec::new();
                if !span.is_synthetic() {
                    labels.push(
                        Label::primary(file_id, span.start..span.end).with_message(span.to_string()),
                    );
                }
                if let Some(decl) = declared_at.filter(|d| !d.is_synthetic()) {
                    labels.push(
                        Label::secondary(file_id, decl.start..decl.end)
                            .with_message(format!("declared here ({decl})")),
                    );
                }
                Diagnostic::error().with_message(message).with_labels(labels)
            }

            CompileError::Internal { message } => {
                Diagnostic::bug().with_message(format!("Internal error: {message}"))
            }

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {err}"))
            }
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
