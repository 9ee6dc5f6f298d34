//! Type reference parsing.
//!
//! A type is a dotted name with optional bracketed arguments:
//!
//! - `Int`
//! - `io.File`
//! - `Map[String, List[Int]]`

use crate::{ast::types::TypeRef, errors::errors::Error, lexer::tokens::TokenKind};

use super::parser::Parser;

pub fn parse_type(parser: &mut Parser) -> Result<TypeRef, Error> {
    let line = parser.get_position()?;
    let mut path = vec![parser.expect_name("a type name")?];

    while parser.current_token_kind()? == TokenKind::Dot {
        parser.advance()?;
        path.push(parser.expect_name("a type name")?);
    }

    let mut arguments = Vec::new();
    if parser.current_token_kind()? == TokenKind::OpenBracket {
        parser.advance()?;
        arguments = parser.in_brackets(|parser| {
            let mut arguments = vec![parse_type(parser)?];
            while parser.current_token_kind()? == TokenKind::Comma {
                parser.advance()?;
                arguments.push(parse_type(parser)?);
            }
            parser.expect(TokenKind::CloseBracket)?;
            Ok(arguments)
        })?;
    }

    Ok(TypeRef {
        path,
        arguments,
        line,
    })
}
