//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::Span;
use logos::Logos;

/// Lexer for C- source code
///
/// Unrecognized characters and out-of-range integer literals come back as
/// `TokenKind::Error` tokens; the parser reports them as syntax errors.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    line_starts: Vec<usize>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            inner: TokenKind::lexer(source),
            line_starts,
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        if self.at_eof {
            return Token::eof(self.end_span());
        }

        match self.inner.next() {
            Some(Ok(TokenKind::EndMarker)) => {
                self.at_eof = true;
                Token::eof(self.current_span())
            }
            Some(Ok(TokenKind::Number)) => {
                let span = self.current_span();
                let lexeme = self.inner.slice();
                match lexeme.parse::<i32>() {
                    Ok(value) => Token::number(value, span, lexeme),
                    Err(_) => Token::new(TokenKind::Error, span, lexeme),
                }
            }
            Some(Ok(kind)) => Token::new(kind, self.current_span(), self.inner.slice()),
            Some(Err(())) => Token::new(TokenKind::Error, self.current_span(), self.inner.slice()),
            None => {
                self.at_eof = true;
                Token::eof(self.end_span())
            }
        }
    }

    /// Tokenize the entire source; the result always ends with one `Eof`
    pub fn tokenize_all(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tracing::trace!(count = tokens.len(), "tokenized source");
        tokens
    }

    fn current_span(&self) -> Span {
        let range = self.inner.span();
        self.span_at(range.start, range.end)
    }

    fn end_span(&self) -> Span {
        let len = self.inner.source().len();
        self.span_at(len, len)
    }

    fn span_at(&self, start: usize, end: usize) -> Span {
        let line_index = self.line_starts.partition_point(|&s| s <= start) - 1;
        let line_start = self.line_starts[line_index];
        let column = self.inner.source()[line_start..start].chars().count() + 1;
        Span::new(start, end, line_index as u32 + 1, column as u32)
    }
}
