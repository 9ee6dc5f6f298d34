//! Statement dispatch and the per-construct productions.
//!
//! A statement is classified by its first token. Keyword lines go through
//! `STMT_LOOKUP`. Lines starting with a name are ambiguous (`Foo x`,
//! `x = 1`, `x += 1`, `x++`, `a, b = ...`, `f(x)`) and are told apart by
//! measuring the leading primary reference with the lookahead buffer and
//! looking at the token right after it. Modifiers and annotations are
//! gathered before dispatch and handed to the declaration they precede.
//!
//! Statements never consume the line break that ends them.

use tracing::debug;

use crate::{
    ast::{
        expressions::Expr,
        statements::{
            Annotation, AssignTarget, Block, ClassDecl, Declaration, Decorations, FunctionDecl,
            FunctionName, Parameter, Stmt, StmtKind,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::{Keyword, Modifier, Token, TokenKind},
    LineInfo,
};

use super::{
    expr::{parse_arguments, parse_expr, parse_expr_list, parse_sequence},
    lookups::{is_declaration_keyword, operator_entry, AUG_ASSIGN_LOOKUP, STMT_LOOKUP},
    parser::{unexpected, Parser},
    types::parse_type,
};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let decorations = parse_decorations(parser)?;
    let token = parser.current_token()?.clone();

    match token.kind {
        TokenKind::Keyword => {
            let Some(keyword) = token.keyword() else {
                return Err(unexpected(&token, "a statement"));
            };
            if keyword == Keyword::This {
                return parse_name_led_stmt(parser, decorations);
            }
            if let Some(handler) = STMT_LOOKUP.get(&keyword) {
                if !is_declaration_keyword(keyword) {
                    reject_decorations(&decorations, &token.line)?;
                }
                debug!(
                    keyword = %token.value,
                    line = token.line.number,
                    "dispatching keyword statement"
                );
                return handler(parser, decorations);
            }
            if keyword.is_expression_keyword() {
                reject_decorations(&decorations, &token.line)?;
                return parse_expression_stmt(parser);
            }
            Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value.clone(),
                    message: format!("`{}` cannot start a statement", token.value),
                },
                token.line,
            ))
        }
        TokenKind::OperatorDef => parse_operator_decl_stmt(parser, decorations),
        TokenKind::Name => parse_name_led_stmt(parser, decorations),
        TokenKind::Newline | TokenKind::EOF | TokenKind::CloseCurly => {
            reject_decorations(&decorations, &token.line)?;
            Err(unexpected(&token, "a statement"))
        }
        _ => {
            reject_decorations(&decorations, &token.line)?;
            parse_expression_stmt(parser)
        }
    }
}

/// `Newline`, `EOF` or the `}` closing the enclosing block.
fn is_statement_end(token: &Token) -> bool {
    token.is_line_end() || token.kind == TokenKind::CloseCurly
}

/// `{ NEWLINE stmt* }`. A statement may share its line with either brace,
/// and the `{` may start a line of its own.
pub fn parse_block(parser: &mut Parser) -> Result<Block, Error> {
    parser.skip_newlines()?;
    let open = parser.expect(TokenKind::OpenCurly)?;
    let mut body = Vec::new();

    loop {
        parser.skip_newlines()?;
        match parser.current_token_kind()? {
            TokenKind::CloseCurly => break,
            TokenKind::EOF => {
                return Err(Error::new(
                    ErrorImpl::UnmatchedBracket {
                        bracket: open.value.clone(),
                    },
                    open.line,
                ))
            }
            _ => {}
        }

        body.push(parse_stmt(parser)?);

        let token = parser.current_token()?;
        if !is_statement_end(token) {
            return Err(unexpected(token, "end of line"));
        }
    }

    parser.expect(TokenKind::CloseCurly)?;
    Ok(Block {
        body,
        line: open.line,
    })
}

// DECORATIONS

fn parse_decorations(parser: &mut Parser) -> Result<Decorations, Error> {
    let mut decorations = Decorations::default();

    loop {
        let token = parser.current_token()?.clone();
        match token.kind {
            TokenKind::Annotation => {
                decorations.annotations.push(parse_annotation(parser)?);
                parser.skip_newlines()?;
            }
            TokenKind::Modifier => {
                let Some(modifier) = token.modifier() else {
                    return Err(unexpected(&token, "a modifier"));
                };
                check_modifier(&decorations, modifier, &token)?;
                parser.advance()?;
                decorations.modifiers.push(modifier);
            }
            _ => return Ok(decorations),
        }
    }
}

fn parse_annotation(parser: &mut Parser) -> Result<Annotation, Error> {
    let token = parser.advance()?;
    let arguments = if parser.current_token_kind()? == TokenKind::OpenParen {
        parse_arguments(parser)?
    } else {
        Vec::new()
    };

    Ok(Annotation {
        name: token.value[1..].to_string(),
        arguments,
        line: token.line,
    })
}

fn check_modifier(
    decorations: &Decorations,
    modifier: Modifier,
    token: &Token,
) -> Result<(), Error> {
    let illegal = |reason: String| {
        Err(Error::new(
            ErrorImpl::IllegalModifier {
                modifier: token.value.clone(),
                reason,
            },
            token.line.clone(),
        ))
    };

    if decorations.has(modifier) {
        return Err(Error::new(
            ErrorImpl::DuplicateModifier {
                modifier: token.value.clone(),
            },
            token.line.clone(),
        ));
    }

    if modifier.is_visibility() {
        if let Some(existing) = decorations.modifiers.iter().find(|m| m.is_visibility()) {
            return illegal(format!("visibility is already `{}`", existing));
        }
    }

    let conflicting = match modifier {
        Modifier::Abstract => Some(Modifier::Final),
        Modifier::Final => Some(Modifier::Abstract),
        _ => None,
    };
    if let Some(conflicting) = conflicting.filter(|m| decorations.has(*m)) {
        return illegal(format!("cannot be combined with `{}`", conflicting));
    }

    Ok(())
}

/// Fails when modifiers or annotations were written before something that
/// is not a declaration.
fn reject_decorations(decorations: &Decorations, line: &LineInfo) -> Result<(), Error> {
    if let Some(modifier) = decorations.modifiers.first() {
        return Err(Error::new(
            ErrorImpl::IllegalModifier {
                modifier: modifier.to_string(),
                reason: String::from("only declarations take modifiers"),
            },
            line.clone(),
        ));
    }
    if let Some(annotation) = decorations.annotations.first() {
        return Err(Error::new(
            ErrorImpl::DanglingAnnotation,
            annotation.line.clone(),
        ));
    }
    Ok(())
}

// NAME-LED STATEMENTS

/// Picks the production for a line starting with a name or `this` from the
/// token after the leading primary reference.
fn parse_name_led_stmt(parser: &mut Parser, decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.current_token()?.line.clone();
    let len = parser.buffer().primary_len(0)?.unwrap_or(1);
    let next = parser.peek(len)?.clone();
    debug!(primary_len = len, next = %next.kind, line = start.number, "name-led statement");

    if next.kind == TokenKind::Name {
        // `Int a, b = ...` declares its first target.
        let multi_target = parser.peek(len + 1)?.kind == TokenKind::Comma
            && parser
                .buffer()
                .line_contains(|token| token.kind == TokenKind::Assign)?;
        if !multi_target {
            return parse_declaration_stmt(parser, decorations);
        }
    }

    reject_decorations(&decorations, &start)?;
    match next.kind {
        TokenKind::Name | TokenKind::Assign => parse_assign_stmt(parser),
        TokenKind::Comma
            if parser
                .buffer()
                .line_contains(|token| token.kind == TokenKind::Assign)? =>
        {
            parse_assign_stmt(parser)
        }
        TokenKind::AugAssign => parse_aug_assign_stmt(parser),
        TokenKind::IncDec if is_statement_end(parser.peek(len + 1)?) => parse_inc_dec_stmt(parser),
        _ => parse_expression_stmt(parser),
    }
}

fn parse_declaration_stmt(parser: &mut Parser, decorations: Decorations) -> Result<Stmt, Error> {
    let line = parser.get_position()?;
    let ty = parse_type(parser)?;
    let name = parser.expect_name("a variable name")?;
    let value = if parser.current_token_kind()? == TokenKind::Assign {
        parser.advance()?;
        Some(parse_expr(parser)?)
    } else {
        None
    };

    Ok(Stmt::new(
        StmtKind::Declaration(Declaration {
            decorations,
            ty,
            name,
            value,
        }),
        line,
    ))
}

fn assignable(target: Expr) -> Result<Expr, Error> {
    if !target.is_assignable() {
        return Err(Error::new(
            ErrorImpl::InvalidAssignmentTarget,
            target.line.clone(),
        ));
    }
    Ok(target)
}

/// A plain target (`a`, `a.b`, `a[i]`) or a declared one (`Type name`).
fn parse_assign_target(parser: &mut Parser) -> Result<AssignTarget, Error> {
    let declared = match parser.buffer().primary_len(0)? {
        Some(len) => parser.peek(len)?.kind == TokenKind::Name,
        None => false,
    };

    if declared {
        let ty = parse_type(parser)?;
        let name = parser.expect_name("a variable name")?;
        return Ok(AssignTarget::Declared { ty, name });
    }

    Ok(AssignTarget::Expr(assignable(parse_expr(parser)?)?))
}

fn parse_assign_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.get_position()?;
    let mut targets = vec![parse_assign_target(parser)?];
    while parser.current_token_kind()? == TokenKind::Comma {
        parser.advance()?;
        targets.push(parse_assign_target(parser)?);
    }

    parser.expect(TokenKind::Assign)?;
    let values = parse_expr_list(parser)?;

    Ok(Stmt::new(StmtKind::Assign { targets, values }, line))
}

fn parse_aug_assign_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.get_position()?;
    let target = assignable(parse_expr(parser)?)?;
    let token = parser.expect(TokenKind::AugAssign)?;
    let Some(operator) = AUG_ASSIGN_LOOKUP.get(token.value.as_str()).copied() else {
        return Err(unexpected(&token, "an augmented assignment"));
    };
    let value = parse_expr(parser)?;

    Ok(Stmt::new(
        StmtKind::AugAssign {
            target,
            operator,
            value,
        },
        line,
    ))
}

fn parse_inc_dec_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.get_position()?;
    let target = assignable(parse_expr(parser)?)?;
    let token = parser.expect(TokenKind::IncDec)?;

    Ok(Stmt::new(
        StmtKind::IncDec {
            target,
            increment: token.value == "++",
        },
        line,
    ))
}

fn parse_expression_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let line = parser.get_position()?;
    let expr = parse_expr(parser)?;
    Ok(Stmt::new(StmtKind::Expression(expr), line))
}

// DECLARATIONS

pub fn parse_class_decl_stmt(parser: &mut Parser, decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let name = parser.expect_name("a class name")?;

    let extends = if parser.at_keyword(Keyword::Extends)? {
        parser.advance()?;
        Some(parse_type(parser)?)
    } else {
        None
    };

    let mut implements = Vec::new();
    if parser.at_keyword(Keyword::Implements)? {
        parser.advance()?;
        implements.push(parse_type(parser)?);
        while parser.current_token_kind()? == TokenKind::Comma {
            parser.advance()?;
            implements.push(parse_type(parser)?);
        }
    }

    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::Class(ClassDecl {
            decorations,
            name,
            extends,
            implements,
            body,
        }),
        start.line,
    ))
}

pub fn parse_function_decl_stmt(
    parser: &mut Parser,
    decorations: Decorations,
) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let name = parser.expect_name("a function name")?;
    parse_function_signature(parser, decorations, FunctionName::Named(name), start.line)
}

/// `operator <op>(...)`: an operator overload, named by its spelling.
pub fn parse_operator_decl_stmt(
    parser: &mut Parser,
    decorations: Decorations,
) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let token = parser.current_token()?.clone();
    if operator_entry(&token).is_none() && token.kind != TokenKind::IncDec {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: token.to_string(),
                message: String::from("expected the operator being defined"),
            },
            token.line,
        ));
    }
    parser.advance()?;
    parse_function_signature(parser, decorations, FunctionName::Operator(token.value), start.line)
}

/// Whether the signature starting at the `(` in front is followed by a body:
/// skips the parameter group, an optional `-> Type` and any line breaks, then
/// checks for `{`.
fn signature_has_body(parser: &mut Parser) -> Result<bool, Error> {
    let buffer = parser.buffer();
    if buffer.peek_kind(0)? != TokenKind::OpenParen {
        return Ok(false);
    }

    let mut offset = buffer.group_len(0)?;
    if buffer.peek_kind(offset)? == TokenKind::Arrow {
        offset += 1;
        match buffer.primary_len(offset)? {
            Some(len) => offset += len,
            None => return Ok(false),
        }
    }
    while buffer.peek_kind(offset)? == TokenKind::Newline {
        offset += 1;
    }
    Ok(buffer.peek_kind(offset)? == TokenKind::OpenCurly)
}

fn parse_function_signature(
    parser: &mut Parser,
    decorations: Decorations,
    name: FunctionName,
    line: LineInfo,
) -> Result<Stmt, Error> {
    let has_body = signature_has_body(parser)?;
    debug!(function = ?name, has_body, line = line.number, "function declaration");

    parser.expect(TokenKind::OpenParen)?;
    let parameters = parser.in_brackets(|parser| {
        parse_sequence(parser, TokenKind::CloseParen, parse_parameter)
    })?;

    let return_type = if parser.current_token_kind()? == TokenKind::Arrow {
        parser.advance()?;
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = if has_body {
        Some(parse_block(parser)?)
    } else {
        None
    };

    Ok(Stmt::new(
        StmtKind::Function(FunctionDecl {
            decorations,
            name,
            parameters,
            return_type,
            body,
        }),
        line,
    ))
}

fn parse_parameter(parser: &mut Parser) -> Result<Parameter, Error> {
    let ty = parse_type(parser)?;
    let name = parser.expect_name("a parameter name")?;
    let default = if parser.current_token_kind()? == TokenKind::Assign {
        parser.advance()?;
        Some(parse_expr(parser)?)
    } else {
        None
    };
    Ok(Parameter { ty, name, default })
}

// CONTROL FLOW

pub fn parse_if_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let condition = parse_expr(parser)?;
    let mut branches = vec![(condition, parse_block(parser)?)];
    let mut otherwise = None;

    // `else` has to follow the `}` on the same line.
    while parser.at_keyword(Keyword::Else)? {
        parser.advance()?;
        if parser.at_keyword(Keyword::If)? {
            parser.advance()?;
            let condition = parse_expr(parser)?;
            branches.push((condition, parse_block(parser)?));
        } else {
            otherwise = Some(parse_block(parser)?);
            break;
        }
    }

    Ok(Stmt::new(
        StmtKind::If {
            branches,
            otherwise,
        },
        start.line,
    ))
}

pub fn parse_while_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let condition = parse_expr(parser)?;
    let body = parse_block(parser)?;
    Ok(Stmt::new(StmtKind::While { condition, body }, start.line))
}

pub fn parse_for_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let variable = parser.expect_name("a loop variable")?;
    parser.expect_keyword(Keyword::In)?;
    let iterable = parse_expr(parser)?;
    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::For {
            variable,
            iterable,
            body,
        },
        start.line,
    ))
}

pub fn parse_return_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let values = if is_statement_end(parser.current_token()?) {
        Vec::new()
    } else {
        parse_expr_list(parser)?
    };
    Ok(Stmt::new(StmtKind::Return(values), start.line))
}

pub fn parse_break_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    Ok(Stmt::new(StmtKind::Break, start.line))
}

pub fn parse_continue_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    Ok(Stmt::new(StmtKind::Continue, start.line))
}

/// `import a.b.c` or `import a.b.c as name`.
pub fn parse_import_stmt(parser: &mut Parser, _decorations: Decorations) -> Result<Stmt, Error> {
    let start = parser.advance()?;
    let mut path = vec![parser.expect_name("a module name")?];
    while parser.current_token_kind()? == TokenKind::Dot {
        parser.advance()?;
        path.push(parser.expect_name("a module name")?);
    }

    let alias = if parser.at_keyword(Keyword::As)? {
        parser.advance()?;
        Some(parser.expect_name("an alias")?)
    } else {
        None
    };

    Ok(Stmt::new(StmtKind::Import { path, alias }, start.line))
}
