//! Lexical analysis module for the front end.
//!
//! This module contains the lexer (tokenizer) that converts source text
//! into a stream of tokens for parsing. It handles:
//!
//! - Tokenization using an ordered catalogue of regex patterns
//! - Recognition of keywords, modifiers, literals, and operators
//! - Logical lines that span several physical lines (multi-line strings,
//!   block comments, escaped newlines)
//! - Line and column tracking for error reporting

pub mod lexer;
pub mod tokens;

#[cfg(test)]
mod tests;
