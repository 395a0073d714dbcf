//! Value types in the AST

use crate::frontend::lexer::TokenKind;
use std::fmt;

/// The value type of a declaration or expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    Int,
    /// Derived type of array declarations and array parameters
    Array,
}

impl ValueType {
    /// Map a type-specifier keyword to its value type
    pub fn from_specifier(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Int => Some(ValueType::Int),
            TokenKind::Void => Some(ValueType::Void),
            _ => None,
        }
    }

    /// Parse-time guess for an expression built from `kind`.
    ///
    /// Only literals are known to be `int`; identifiers are stamped `void`
    /// until name resolution replaces the guess.
    pub fn provisional(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Number => ValueType::Int,
            _ => ValueType::Void,
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, ValueType::Int)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, ValueType::Void)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Void => write!(f, "Void"),
            ValueType::Int => write!(f, "Int"),
            ValueType::Array => write!(f, "Array"),
        }
    }
}
