#![allow(clippy::module_inception)]

use std::{fmt::Display, path::Path, rc::Rc};

use crate::{ast::ast::Module, errors::errors::Error, lexer::lexer::Lexer};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// Where a token came from.
///
/// `text` is the whole logical line (possibly several physical lines joined
/// by a multi-line string, block comment or escaped newline) and is shared
/// between every token lexed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct LineInfo {
    pub number: usize,
    pub text: Rc<String>,
    pub column: usize,
    pub file: Rc<String>,
}

impl LineInfo {
    pub fn new(number: usize, text: Rc<String>, column: usize, file: Rc<String>) -> Self {
        LineInfo {
            number,
            text,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        LineInfo {
            number: 0,
            text: Rc::new(String::new()),
            column: 0,
            file: Rc::new(String::from("<null>")),
        }
    }

    /// Column relative to the physical line the column falls on, for
    /// drawing the caret under a multi-line logical line.
    pub fn caret_column(&self) -> usize {
        let prefix: String = self.text.chars().take(self.column).collect();
        match prefix.rfind('\n') {
            Some(newline) => prefix[newline + 1..].chars().count(),
            None => self.column,
        }
    }
}

impl Display for LineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.number, self.column + 1)
    }
}

/// Parses a whole file. The file is read lazily, line by line, as the
/// parser asks for tokens.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module, Error> {
    let lexer = Lexer::from_path(path.as_ref())?;
    parser::parser::parse(lexer)
}

/// Parses an in-memory source string.
pub fn parse_source(source: &str, file: Option<String>) -> Result<Module, Error> {
    parser::parser::parse(Lexer::from_source(source, file))
}
