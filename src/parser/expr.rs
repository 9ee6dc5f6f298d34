//! Expression parsing.
//!
//! Operators are resolved by precedence climbing over an explicit stack of
//! partially built operator frames rather than by recursion. The parser
//! alternates between two positions:
//!
//! - expecting an operand, where an operator spelling is read as prefix
//!   (`-x`, `not x`) and anything else must start an atom;
//! - after an operand, where the same spelling is read as infix or postfix.
//!
//! Pushing an infix operator first folds every frame on the stack that binds
//! at least as tightly. When the frame it reaches has the very same operator,
//! the operand joins that frame instead, so `a + b + c` becomes one node with
//! three operands. A token that cannot continue the expression ends it.

use std::{iter::Peekable, str::Chars};

use tracing::trace;

use crate::{
    ast::expressions::{Argument, Expr, ExprKind, FormatPart, Literal},
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{unescape, Lexer},
        tokens::{Keyword, Token, TokenKind},
    },
    LineInfo, MK_TOKEN,
};

use super::{
    lookups::{operator_entry, Fixity, OperatorInfo},
    parser::Parser,
    types::parse_type,
};

/// A partially built operator node waiting for its last operand.
struct Frame {
    info: OperatorInfo,
    line: LineInfo,
    operands: Vec<Expr>,
}

impl Frame {
    fn fold(mut self, operand: Expr) -> Result<Expr, Error> {
        let operator = self.info.operator;
        match self.info.fixity {
            Fixity::Prefix => Ok(Expr::new(
                ExprKind::Unary {
                    operator,
                    operand: Box::new(operand),
                },
                self.line,
            )),
            Fixity::Infix => {
                if self.operands.is_empty() {
                    return Err(Error::new(
                        ErrorImpl::MissingOperand {
                            operator: operator.to_string(),
                        },
                        self.line,
                    ));
                }
                self.operands.push(operand);
                Ok(Expr::new(
                    ExprKind::Binary {
                        operator,
                        operands: self.operands,
                    },
                    self.line,
                ))
            }
            // Postfix operators wrap their operand as soon as they are read
            // and never wait on the stack.
            Fixity::Postfix => Err(Error::new(
                ErrorImpl::IllegalPostfixOperator {
                    operator: operator.to_string(),
                },
                self.line,
            )),
        }
    }
}

pub fn parse_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parse_ternary(parser, true)
}

/// Parses an expression that may not be a bare `a if c else b`, so that a
/// following `if` is left for the caller (comprehension filters).
pub fn parse_expr_without_ternary(parser: &mut Parser) -> Result<Expr, Error> {
    parse_ternary(parser, false)
}

/// `a, b, c` up to the first token that is not a comma.
pub fn parse_expr_list(parser: &mut Parser) -> Result<Vec<Expr>, Error> {
    let mut values = vec![parse_expr(parser)?];
    while parser.current_token_kind()? == TokenKind::Comma {
        parser.advance()?;
        values.push(parse_expr(parser)?);
    }
    Ok(values)
}

fn parse_ternary(parser: &mut Parser, allow_ternary: bool) -> Result<Expr, Error> {
    let then_value = parse_operators(parser)?;
    if !allow_ternary || !parser.at_keyword(Keyword::If)? {
        return Ok(then_value);
    }

    parser.advance()?;
    let condition = parse_operators(parser)?;
    parser.expect_keyword(Keyword::Else)?;
    let else_value = parse_ternary(parser, true)?;

    let line = then_value.line.clone();
    Ok(Expr::new(
        ExprKind::Ternary {
            then_value: Box::new(then_value),
            condition: Box::new(condition),
            else_value: Box::new(else_value),
        },
        line,
    ))
}

/// The operator core: operands, prefix, infix and postfix operators.
pub fn parse_operators(parser: &mut Parser) -> Result<Expr, Error> {
    let mut stack: Vec<Frame> = Vec::new();

    loop {
        let token = parser.current_token()?.clone();
        if token.kind == TokenKind::IncDec {
            split_inc_dec(parser)?;
            continue;
        }
        if let Some(info) = operator_entry(&token).and_then(|entry| entry.prefix) {
            parser.advance()?;
            stack.push(Frame {
                info,
                line: token.line,
                operands: Vec::new(),
            });
            continue;
        }
        if !starts_operand(&token) {
            return Err(illegal_token(&token));
        }

        let mut operand = parse_primary(parser)?;

        loop {
            let token = parser.current_token()?.clone();
            if token.kind == TokenKind::IncDec && continues_after_inc_dec(parser)? {
                split_inc_dec(parser)?;
                continue;
            }

            let Some(entry) = operator_entry(&token) else {
                return fold_all(stack, operand);
            };

            if let Some(info) = entry.infix {
                parser.advance()?;
                push_infix(&mut stack, operand, info)?;
                break;
            }

            if let Some(info) = entry.postfix {
                parser.advance()?;
                let folded = fold_while(&mut stack, operand, info.precedence)?;
                let line = folded.line.clone();
                operand = Expr::new(
                    ExprKind::Postfix {
                        operator: info.operator,
                        operand: Box::new(folded),
                    },
                    line,
                );
                continue;
            }

            // A prefix-only operator right after an operand, e.g. `a ~ b`.
            return Err(illegal_token(&token));
        }
    }
}

fn push_infix(stack: &mut Vec<Frame>, mut operand: Expr, info: OperatorInfo) -> Result<(), Error> {
    while let Some(top) = stack.last_mut() {
        if top.info.precedence > info.precedence {
            break;
        }
        if top.info.fixity == Fixity::Infix && top.info.operator == info.operator {
            trace!(
                operator = %info.operator,
                operands = top.operands.len() + 1,
                "flattened operand"
            );
            top.operands.push(operand);
            return Ok(());
        }
        let Some(frame) = stack.pop() else { break };
        operand = frame.fold(operand)?;
    }

    let line = operand.line.clone();
    stack.push(Frame {
        info,
        line,
        operands: vec![operand],
    });
    Ok(())
}

/// Folds every frame binding at least as tightly as `precedence` into
/// `operand`.
fn fold_while(stack: &mut Vec<Frame>, mut operand: Expr, precedence: u8) -> Result<Expr, Error> {
    while stack.last().is_some_and(|top| top.info.precedence <= precedence) {
        let Some(frame) = stack.pop() else { break };
        operand = frame.fold(operand)?;
    }
    Ok(operand)
}

fn fold_all(mut stack: Vec<Frame>, mut operand: Expr) -> Result<Expr, Error> {
    while let Some(frame) = stack.pop() {
        operand = frame.fold(operand)?;
    }
    Ok(operand)
}

fn illegal_token(token: &Token) -> Error {
    Error::new(
        ErrorImpl::IllegalToken {
            token: token.to_string(),
        },
        token.line.clone(),
    )
}

fn starts_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Integer
        | TokenKind::Float
        | TokenKind::String
        | TokenKind::FormatString
        | TokenKind::Name
        | TokenKind::OpenParen
        | TokenKind::OpenBracket
        | TokenKind::OpenCurly => true,
        TokenKind::Keyword => matches!(
            token.keyword(),
            Some(Keyword::True | Keyword::False | Keyword::Null | Keyword::This | Keyword::New)
        ),
        _ => false,
    }
}

/// Whether the `++`/`--` at the front is followed by something it could be
/// a pair of operators for, as in `a--b`.
fn continues_after_inc_dec(parser: &mut Parser) -> Result<bool, Error> {
    let next = parser.peek(1)?;
    Ok(starts_operand(next)
        || next.kind == TokenKind::IncDec
        || operator_entry(next).is_some_and(|entry| entry.prefix.is_some()))
}

/// Replaces the `++`/`--` at the front with two single-character operators.
fn split_inc_dec(parser: &mut Parser) -> Result<(), Error> {
    let token = parser.advance()?;
    let half = token.value[..1].to_string();
    let mut second = token.line.clone();
    second.column += 1;

    parser
        .buffer()
        .insert(0, MK_TOKEN!(TokenKind::Operator, half.clone(), second))?;
    parser
        .buffer()
        .insert(0, MK_TOKEN!(TokenKind::Operator, half, token.line))?;
    Ok(())
}

/// An atom followed by any number of `.name`, `(args)` and `[indices]`
/// trailers.
fn parse_primary(parser: &mut Parser) -> Result<Expr, Error> {
    let mut expr = parse_atom(parser)?;

    loop {
        let line = expr.line.clone();
        match parser.current_token_kind()? {
            TokenKind::Dot => {
                parser.advance()?;
                let name = parser.expect_name("a member name")?;
                expr = Expr::new(
                    ExprKind::Member {
                        target: Box::new(expr),
                        name,
                    },
                    line,
                );
            }
            TokenKind::OpenParen => {
                let arguments = parse_arguments(parser)?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        arguments,
                    },
                    line,
                );
            }
            TokenKind::OpenBracket => {
                let open = parser.advance()?;
                let indices = parser.in_brackets(|parser| {
                    parse_sequence(parser, TokenKind::CloseBracket, parse_expr)
                })?;
                if indices.is_empty() {
                    return Err(illegal_token(&MK_TOKEN!(
                        TokenKind::CloseBracket,
                        String::from("]"),
                        open.line
                    )));
                }
                expr = Expr::new(
                    ExprKind::Index {
                        target: Box::new(expr),
                        indices,
                    },
                    line,
                );
            }
            _ => return Ok(expr),
        }
    }
}

fn parse_atom(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token()?.clone();

    let literal = match token.kind {
        TokenKind::Integer => Literal::Integer(parse_integer(&token)?),
        TokenKind::Float => {
            let value = token.value.replace('_', "").parse::<f64>().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    token.line.clone(),
                )
            })?;
            Literal::Float(value)
        }
        TokenKind::String => {
            let body = &token.value[1..token.value.len() - 1];
            Literal::String(unescape(body).map_err(|e| Error::new(e, token.line.clone()))?)
        }
        TokenKind::Name => {
            parser.advance()?;
            return Ok(Expr::new(ExprKind::Name(token.value), token.line));
        }
        TokenKind::FormatString => {
            parser.advance()?;
            return parse_format_string(&token);
        }
        TokenKind::OpenParen => return parse_parenthesized(parser),
        TokenKind::OpenBracket => return parse_list(parser),
        TokenKind::OpenCurly => return parse_map(parser),
        TokenKind::Keyword => match token.keyword() {
            Some(Keyword::True) => Literal::Boolean(true),
            Some(Keyword::False) => Literal::Boolean(false),
            Some(Keyword::Null) => Literal::Null,
            Some(Keyword::This) => {
                parser.advance()?;
                return Ok(Expr::new(ExprKind::This, token.line));
            }
            Some(Keyword::New) => return parse_new(parser),
            _ => return Err(illegal_token(&token)),
        },
        _ => return Err(illegal_token(&token)),
    };

    parser.advance()?;
    Ok(Expr::new(ExprKind::Literal(literal), token.line))
}

fn parse_integer(token: &Token) -> Result<i64, Error> {
    let digits = token.value.replace('_', "");
    let parsed = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse(),
    };

    parsed.map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: token.value.clone(),
            },
            token.line.clone(),
        )
    })
}

/// Comma separated items up to and including `close`. A trailing comma is
/// allowed. Called with the opening bracket already consumed.
pub fn parse_sequence<T>(
    parser: &mut Parser,
    close: TokenKind,
    mut item: impl FnMut(&mut Parser) -> Result<T, Error>,
) -> Result<Vec<T>, Error> {
    let mut items = Vec::new();
    while parser.current_token_kind()? != close {
        items.push(item(parser)?);
        if parser.current_token_kind()? != close {
            parser.expect(TokenKind::Comma)?;
        }
    }
    parser.expect(close)?;
    Ok(items)
}

/// `(a, key=value)` for calls, `new` and annotations.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Argument>, Error> {
    parser.expect(TokenKind::OpenParen)?;
    parser.in_brackets(|parser| {
        parse_sequence(parser, TokenKind::CloseParen, |parser| {
            let named = parser.current_token_kind()? == TokenKind::Name
                && parser.peek(1)?.kind == TokenKind::Assign;
            let name = if named {
                let name = parser.advance()?.value;
                parser.advance()?;
                Some(name)
            } else {
                None
            };
            Ok(Argument {
                name,
                value: parse_expr(parser)?,
            })
        })
    })
}

/// A grouping `(a)`, or a tuple `()`, `(a,)`, `(a, b)`.
fn parse_parenthesized(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance()?;
    parser.in_brackets(|parser| {
        if parser.current_token_kind()? == TokenKind::CloseParen {
            parser.advance()?;
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), open.line));
        }

        let first = parse_expr(parser)?;
        if parser.current_token_kind()? != TokenKind::Comma {
            parser.expect(TokenKind::CloseParen)?;
            return Ok(first);
        }

        parser.advance()?;
        let mut items = vec![first];
        items.extend(parse_sequence(parser, TokenKind::CloseParen, parse_expr)?);
        Ok(Expr::new(ExprKind::Tuple(items), open.line))
    })
}

fn parse_list(parser: &mut Parser) -> Result<Expr, Error> {
    let is_comprehension = parser
        .buffer()
        .group_contains(|token| token.is_keyword(Keyword::For))?;
    let open = parser.advance()?;

    parser.in_brackets(|parser| {
        if !is_comprehension {
            let items = parse_sequence(parser, TokenKind::CloseBracket, parse_expr)?;
            return Ok(Expr::new(ExprKind::List(items), open.line));
        }

        let element = parse_expr(parser)?;
        parser.expect_keyword(Keyword::For)?;
        let variable = parser.expect_name("a loop variable")?;
        parser.expect_keyword(Keyword::In)?;
        let iterable = parse_expr_without_ternary(parser)?;
        let condition = if parser.at_keyword(Keyword::If)? {
            parser.advance()?;
            Some(Box::new(parse_expr_without_ternary(parser)?))
        } else {
            None
        };
        parser.expect(TokenKind::CloseBracket)?;

        Ok(Expr::new(
            ExprKind::Comprehension {
                element: Box::new(element),
                variable,
                iterable: Box::new(iterable),
                condition,
            },
            open.line,
        ))
    })
}

fn parse_map(parser: &mut Parser) -> Result<Expr, Error> {
    let open = parser.advance()?;
    parser.in_brackets(|parser| {
        let entries = parse_sequence(parser, TokenKind::CloseCurly, |parser| {
            let key = parse_expr(parser)?;
            parser.expect(TokenKind::Colon)?;
            let value = parse_expr(parser)?;
            Ok((key, value))
        })?;
        Ok(Expr::new(ExprKind::Map(entries), open.line))
    })
}

/// `new Type` or `new Type(args)`.
fn parse_new(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.advance()?;
    let ty = parse_type(parser)?;
    let arguments = if parser.current_token_kind()? == TokenKind::OpenParen {
        parse_arguments(parser)?
    } else {
        Vec::new()
    };

    Ok(Expr::new(ExprKind::New { ty, arguments }, start.line))
}

fn format_error(token: &Token, message: &str) -> Error {
    Error::new(
        ErrorImpl::MalformedFormatString {
            message: message.to_string(),
        },
        token.line.clone(),
    )
}

/// Splits `f"..."` into text and `{expression}` parts. Each expression is
/// lexed and parsed on its own; `{{` and `}}` stand for literal braces.
fn parse_format_string(token: &Token) -> Result<Expr, Error> {
    let body = &token.value[2..token.value.len() - 1];
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                text.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                text.push('}');
            }
            '{' => {
                if !text.is_empty() {
                    let unescaped = unescape(&text).map_err(|e| Error::new(e, token.line.clone()))?;
                    parts.push(FormatPart::Text(unescaped));
                    text.clear();
                }
                let Some(source) = take_interpolation(&mut chars) else {
                    return Err(format_error(
                        token,
                        "unclosed `{`, quotes inside `{}` are written `\\\"`",
                    ));
                };
                parts.push(FormatPart::Expr(parse_interpolation(&source, token)?));
            }
            '}' => {
                return Err(format_error(token, "a literal `}` is written `}}`"));
            }
            ch => text.push(ch),
        }
    }

    if !text.is_empty() {
        let unescaped = unescape(&text).map_err(|e| Error::new(e, token.line.clone()))?;
        parts.push(FormatPart::Text(unescaped));
    }

    Ok(Expr::new(ExprKind::FormatString(parts), token.line.clone()))
}

/// Collects the source of one `{...}` segment, the opening brace already
/// consumed. Quotes inside a segment are written `\"` and come out as plain
/// `"`. Braces inside nested braces and string literals do not close it.
/// `None` when the segment never closes.
fn take_interpolation(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut source = String::new();
    let mut depth = 0usize;
    let mut in_string = false;

    while let Some(mut ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&'"') {
            chars.next();
            ch = '"';
        } else if ch == '\\' && in_string {
            // Escape of the inner literal, left for its own unescaping.
            source.push(ch);
            source.extend(chars.next());
            continue;
        }

        match ch {
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string && depth == 0 => return Some(source),
            '}' if !in_string => depth -= 1,
            _ => {}
        }
        source.push(ch);
    }
    None
}

fn parse_interpolation(source: &str, token: &Token) -> Result<Expr, Error> {
    let lexer = Lexer::from_source(source, Some(token.line.file.to_string()));
    let mut parser = Parser::new(lexer);

    parser
        .in_brackets(|parser| {
            let expr = parse_expr(parser)?;
            let next = parser.current_token()?;
            if next.kind != TokenKind::EOF {
                return Err(illegal_token(next));
            }
            Ok(expr)
        })
        .map_err(|error| Error::new(error.get_impl().clone(), token.line.clone()))
}

#[cfg(test)]
mod tests {
    use super::{Frame, OperatorInfo};
    use crate::{
        ast::expressions::{Expr, ExprKind, Operator},
        errors::errors::ErrorImpl,
        parser::lookups::Fixity,
        LineInfo,
    };

    fn frame(operator: Operator, fixity: Fixity) -> Frame {
        Frame {
            info: OperatorInfo {
                operator,
                precedence: 1,
                fixity,
            },
            line: LineInfo::null(),
            operands: Vec::new(),
        }
    }

    fn name(value: &str) -> Expr {
        Expr::new(ExprKind::Name(value.to_string()), LineInfo::null())
    }

    #[test]
    fn test_fold_infix_frame_without_operand() {
        let error = frame(Operator::Add, Fixity::Infix).fold(name("a")).unwrap_err();

        assert_eq!(
            error.get_impl(),
            &ErrorImpl::MissingOperand {
                operator: "+".to_string()
            }
        );
        assert!(error.is_internal());
    }

    #[test]
    fn test_fold_postfix_frame() {
        let error = frame(Operator::Unwrap, Fixity::Postfix).fold(name("a")).unwrap_err();

        assert_eq!(
            error.get_impl(),
            &ErrorImpl::IllegalPostfixOperator {
                operator: "?".to_string()
            }
        );
        assert!(error.is_internal());
    }

    #[test]
    fn test_fold_prefix_frame() {
        let folded = frame(Operator::Negate, Fixity::Prefix).fold(name("a")).unwrap();

        assert_eq!(folded.to_string(), "(- a)");
    }
}
