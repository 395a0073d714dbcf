//! Parser module

mod parser;

pub use parser::{Parser, MAX_NESTING};
