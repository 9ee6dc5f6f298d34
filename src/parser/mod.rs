//! Parser module for building the syntax tree of one file.
//!
//! Tokens flow from the lexer into a lookahead buffer backed by a growable
//! ring buffer. On top of it:
//!
//! - the statement dispatcher classifies each line by its first token and,
//!   for lines starting with a name, by structural lookahead
//! - the expression parser resolves operators by precedence climbing over an
//!   explicit stack, flattening runs of the same operator into n-ary nodes
//! - the type parser reads dotted, optionally generic type references
//!
//! Parsing is all-or-nothing: the first error ends it.

pub mod expr;
pub mod lookahead;
pub mod lookups;
pub mod parser;
pub mod ring_buffer;
pub mod stmt;
pub mod types;
