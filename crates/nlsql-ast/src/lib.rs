//! NLSQL AST - tokenizer and parser for generated SELECT statements
//!
//! Produces the typed [`nlsql_ir::ParsedStatement`] the executor runs.
//! Only the statement shapes the translator emits are accepted; anything
//! else is a [`ParseError`].

pub mod parser;

pub use parser::{parse, ParseError};
