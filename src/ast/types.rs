//! Type references for the AST.
//!
//! The front end does not resolve types; a type is recorded exactly as it
//! was written: a dotted path with optional bracketed type arguments, e.g.
//! `collections.Map[String, List[Int]]`.

use std::fmt::Display;

use crate::LineInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub path: Vec<String>,
    pub arguments: Vec<TypeRef>,
    pub line: LineInfo,
}

impl TypeRef {
    pub fn is_generic(&self) -> bool {
        !self.arguments.is_empty()
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.join("."))?;
        if self.is_generic() {
            let arguments: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
            write!(f, "[{}]", arguments.join(", "))?;
        }
        Ok(())
    }
}
