//! Token definitions for the C- lexer

use crate::common::Span;
use logos::Logos;

/// Token with source location, lexeme and (for numbers) its value
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub lexeme: String,
    pub value: Option<i32>,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            lexeme: lexeme.into(),
            value: None,
        }
    }

    pub fn number(value: i32, span: Span, lexeme: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Number,
            span,
            lexeme: lexeme.into(),
            value: Some(value),
        }
    }

    pub fn eof(span: Span) -> Self {
        Self::new(TokenKind::Eof, span, "")
    }

    /// Text used when this token shows up in a diagnostic
    pub fn describe(&self) -> &str {
        if self.kind == TokenKind::Eof {
            "end of input"
        } else {
            &self.lexeme
        }
    }
}

/// All token kinds in C-
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\r\f]+")]  // Skip whitespace
#[logos(skip r"//[^\n]*")]      // Skip line comments
#[logos(skip r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")] // Skip block comments
pub enum TokenKind {
    // === Keywords ===
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("int")]
    Int,
    #[token("void")]
    Void,
    #[token("return")]
    Return,
    #[token("while")]
    While,

    // === Identifiers and literals ===
    #[regex(r"[a-zA-Z]+")]
    Identifier,

    #[regex(r"[0-9]+")]
    Number,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("=")]
    Eq,

    // === Punctuation ===
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    /// Interactive end-of-input marker
    #[token("$")]
    EndMarker,

    // Special
    Error,
    Eof,
}

impl TokenKind {
    /// Check if this token is a type specifier keyword
    pub fn is_type_specifier(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Void)
    }

    pub fn is_relational_op(&self) -> bool {
        matches!(
            self,
            TokenKind::Lt
                | TokenKind::LtEq
                | TokenKind::Gt
                | TokenKind::GtEq
                | TokenKind::EqEq
                | TokenKind::NotEq
        )
    }

    pub fn is_additive_op(&self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    pub fn is_multiplicative_op(&self) -> bool {
        matches!(self, TokenKind::Star | TokenKind::Slash)
    }

    /// Check if this token can begin an expression (`factor` FIRST set)
    pub fn can_start_expression(&self) -> bool {
        matches!(self, TokenKind::Identifier | TokenKind::Number | TokenKind::LParen)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::Number => write!(f, "number"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Semi => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::EndMarker => write!(f, "'$'"),
            TokenKind::Error => write!(f, "invalid token"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}
