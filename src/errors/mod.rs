//! Error types and error handling for the front end.
//!
//! Every error carries the `LineInfo` of the token that was current when it
//! was raised, so it can surface from any nesting depth with a precise line,
//! column and source text. Errors are split into two categories:
//!
//! - syntax errors: the source is malformed
//! - internal errors: an invariant of the parser itself was violated

pub mod errors;
