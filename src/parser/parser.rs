//! The parser state shared by the statement dispatcher, the expression
//! parser and the type parser.
//!
//! `Parser` wraps the lookahead buffer with the cursor helpers every
//! production uses (`current_token`, `advance`, `expect`) and tracks whether
//! the cursor is inside a bracket, where line breaks are insignificant.

use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::ast::Module,
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::Lexer,
        tokens::{Keyword, Token, TokenKind},
    },
    LineInfo,
};

use super::{lookahead::LookaheadBuffer, stmt::parse_stmt};

pub struct Parser {
    tokens: LookaheadBuffer,
    file: Rc<String>,
    /// How many brackets the expression parser is currently inside.
    bracket_depth: usize,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        let file = lexer.file();
        Parser {
            tokens: LookaheadBuffer::new(lexer),
            file,
            bracket_depth: 0,
        }
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    /// Direct access to the buffer for the structural scanners.
    pub fn buffer(&mut self) -> &mut LookaheadBuffer {
        &mut self.tokens
    }

    /// The next significant token. Inside brackets, newlines are skipped.
    pub fn current_token(&mut self) -> Result<&Token, Error> {
        if self.bracket_depth > 0 {
            self.tokens.skip_newlines()?;
        }
        self.tokens.peek(0)
    }

    pub fn current_token_kind(&mut self) -> Result<TokenKind, Error> {
        Ok(self.current_token()?.kind)
    }

    /// Raw lookahead, newlines included.
    pub fn peek(&mut self, i: usize) -> Result<&Token, Error> {
        self.tokens.peek(i)
    }

    pub fn at_keyword(&mut self, keyword: Keyword) -> Result<bool, Error> {
        Ok(self.current_token()?.is_keyword(keyword))
    }

    pub fn advance(&mut self) -> Result<Token, Error> {
        if self.bracket_depth > 0 {
            self.tokens.skip_newlines()?;
        }
        self.tokens.advance()
    }

    pub fn skip_newlines(&mut self) -> Result<(), Error> {
        self.tokens.skip_newlines()
    }

    pub fn get_position(&mut self) -> Result<LineInfo, Error> {
        Ok(self.current_token()?.line.clone())
    }

    /// Consumes a token of `expected_kind`, or fails naming what was wanted.
    pub fn expect(&mut self, expected_kind: TokenKind) -> Result<Token, Error> {
        self.expect_error(expected_kind, None)
    }

    pub fn expect_error(
        &mut self,
        expected_kind: TokenKind,
        error: Option<Error>,
    ) -> Result<Token, Error> {
        let token = self.current_token()?;
        if token.kind == expected_kind {
            return self.advance();
        }

        match error {
            Some(error) => Err(error),
            None => Err(unexpected(token, describe(expected_kind))),
        }
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, Error> {
        let token = self.current_token()?;
        if token.is_keyword(keyword) {
            return self.advance();
        }
        Err(unexpected(token, &format!("`{}`", keyword_spelling(keyword))))
    }

    /// Consumes a name; `what` says what the name was for in the error.
    pub fn expect_name(&mut self, what: &str) -> Result<String, Error> {
        let token = self.current_token()?;
        if token.kind == TokenKind::Name {
            return Ok(self.advance()?.value);
        }
        Err(unexpected(token, what))
    }

    /// Runs `parse` with newlines made insignificant, for the contents of a
    /// bracket.
    pub fn in_brackets<T>(
        &mut self,
        parse: impl FnOnce(&mut Parser) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.bracket_depth += 1;
        let result = parse(self);
        self.bracket_depth -= 1;
        result
    }
}

pub fn unexpected(token: &Token, expected: &str) -> Error {
    Error::new(
        ErrorImpl::UnexpectedToken {
            expected: expected.to_string(),
            found: token.to_string(),
        },
        token.line.clone(),
    )
}

fn describe(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::EOF => "end of file",
        TokenKind::Newline => "end of line",
        TokenKind::Name => "a name",
        TokenKind::OpenParen => "`(`",
        TokenKind::CloseParen => "`)`",
        TokenKind::OpenBracket => "`[`",
        TokenKind::CloseBracket => "`]`",
        TokenKind::OpenCurly => "`{`",
        TokenKind::CloseCurly => "`}`",
        TokenKind::Comma => "`,`",
        TokenKind::Colon => "`:`",
        TokenKind::Dot => "`.`",
        TokenKind::Arrow => "`->`",
        TokenKind::Assign => "`=`",
        TokenKind::Integer | TokenKind::Float => "a number",
        TokenKind::String | TokenKind::FormatString => "a string",
        TokenKind::Keyword => "a keyword",
        TokenKind::Modifier => "a modifier",
        TokenKind::Operator | TokenKind::IncDec | TokenKind::AugAssign => "an operator",
        TokenKind::Ellipsis => "`...`",
        TokenKind::OperatorDef => "`operator`",
        TokenKind::Annotation => "an annotation",
        TokenKind::Whitespace | TokenKind::Comment => "a token",
    }
}

fn keyword_spelling(keyword: Keyword) -> &'static str {
    crate::lexer::tokens::RESERVED_LOOKUP
        .iter()
        .find(|(_, k)| **k == keyword)
        .map(|(word, _)| *word)
        .unwrap_or("?")
}

/// Parses a whole file into a module. The first error ends the parse.
pub fn parse(lexer: Lexer) -> Result<Module, Error> {
    let mut parser = Parser::new(lexer);
    let mut body = Vec::new();

    loop {
        parser.skip_newlines()?;
        if parser.current_token_kind()? == TokenKind::EOF {
            break;
        }

        body.push(parse_stmt(&mut parser)?);

        let token = parser.current_token()?;
        if !token.is_line_end() {
            return Err(unexpected(token, "end of line"));
        }
    }

    debug!(file = %parser.file(), statements = body.len(), "parsed module");
    Ok(Module {
        file: parser.file(),
        body,
    })
}
