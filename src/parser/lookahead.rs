//! Random-access lookahead over the lexer's output.
//!
//! Index 0 is always the next unconsumed token. Tokens are pulled from the
//! lexer only when an index past the end is asked for, so looking ahead
//! never reads more of the file than the parser actually inspects.
//!
//! Besides plain peeking, the buffer offers the structural scanners the
//! statement dispatcher uses to tell grammar alternatives apart without
//! parsing anything: they skip balanced brackets and report what follows.

use std::rc::Rc;

use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::Lexer,
        tokens::{Keyword, Token, TokenKind},
    },
};

use super::ring_buffer::RingBuffer;

pub struct LookaheadBuffer {
    lexer: Lexer,
    tokens: RingBuffer<Token>,
}

impl LookaheadBuffer {
    pub fn new(lexer: Lexer) -> Self {
        LookaheadBuffer {
            lexer,
            tokens: RingBuffer::new(),
        }
    }

    pub fn file(&self) -> Rc<String> {
        self.lexer.file()
    }

    /// Pulls tokens from the lexer until index `n` exists.
    pub fn ensure(&mut self, n: usize) -> Result<(), Error> {
        while self.tokens.len() <= n {
            let capacity = self.tokens.capacity();
            self.tokens.push_back(self.lexer.next_token()?);
            if self.tokens.capacity() != capacity {
                trace!(capacity = self.tokens.capacity(), "lookahead buffer grew");
            }
        }
        Ok(())
    }

    pub fn peek(&mut self, i: usize) -> Result<&Token, Error> {
        self.ensure(i)?;
        match self.tokens.get(i) {
            Some(token) => Ok(token),
            None => unreachable!("ensure({}) left the buffer short", i),
        }
    }

    pub fn peek_kind(&mut self, i: usize) -> Result<TokenKind, Error> {
        Ok(self.peek(i)?.kind)
    }

    /// Tests the token at offset `i` without consuming anything.
    pub fn is(&mut self, i: usize, predicate: impl FnOnce(&Token) -> bool) -> Result<bool, Error> {
        Ok(predicate(self.peek(i)?))
    }

    /// Consumes the front token.
    pub fn advance(&mut self) -> Result<Token, Error> {
        self.ensure(0)?;
        match self.tokens.pop_front() {
            Some(token) => Ok(token),
            None => unreachable!("ensure(0) left the buffer empty"),
        }
    }

    /// Consumes the front token and any newlines right after it.
    pub fn advance_skipping_newlines(&mut self) -> Result<Token, Error> {
        let token = self.advance()?;
        self.skip_newlines()?;
        Ok(token)
    }

    pub fn skip_newlines(&mut self) -> Result<(), Error> {
        while self.peek_kind(0)? == TokenKind::Newline {
            self.advance()?;
        }
        Ok(())
    }

    /// Puts a token back at offset `i`. Used to split a token the lexer
    /// produced greedily into smaller ones.
    pub fn insert(&mut self, i: usize, token: Token) -> Result<(), Error> {
        if i > 0 {
            self.ensure(i - 1)?;
        }
        self.tokens.insert(i, token);
        Ok(())
    }

    /// Length in tokens of the balanced group opening at `offset`, both
    /// brackets included.
    pub fn group_len(&mut self, offset: usize) -> Result<usize, Error> {
        let open = self.peek(offset)?.clone();
        let Some(closer) = open.kind.closer() else {
            return Err(Error::new(
                ErrorImpl::NotABracket {
                    token: open.value.clone(),
                },
                open.line,
            ));
        };

        let mut closers = vec![closer];
        let mut i = offset + 1;
        loop {
            let token = self.peek(i)?;
            if let Some(closer) = token.kind.closer() {
                closers.push(closer);
            } else if token.kind.is_close_bracket() {
                if closers.last() != Some(&token.kind) {
                    return Err(Error::new(
                        ErrorImpl::UnmatchedBracket {
                            bracket: token.value.clone(),
                        },
                        token.line.clone(),
                    ));
                }
                closers.pop();
                if closers.is_empty() {
                    return Ok(i - offset + 1);
                }
            } else if token.kind == TokenKind::EOF {
                return Err(Error::new(
                    ErrorImpl::UnmatchedBracket {
                        bracket: open.value.clone(),
                    },
                    open.line,
                ));
            }
            i += 1;
        }
    }

    /// Length in tokens of a primary reference starting at `offset`: a name
    /// (or `this`) followed by any chain of `.name`, `[...]` and `(...)`.
    /// `None` when the token at `offset` cannot start one.
    pub fn primary_len(&mut self, offset: usize) -> Result<Option<usize>, Error> {
        let starts_primary = self.is(offset, |token| {
            token.kind == TokenKind::Name || token.is_keyword(Keyword::This)
        })?;
        if !starts_primary {
            return Ok(None);
        }

        let mut len = 1;
        loop {
            match self.peek_kind(offset + len)? {
                TokenKind::Dot if self.peek_kind(offset + len + 1)? == TokenKind::Name => {
                    len += 2;
                }
                TokenKind::OpenBracket | TokenKind::OpenParen => {
                    len += self.group_len(offset + len)?;
                }
                _ => return Ok(Some(len)),
            }
        }
    }

    /// Whether a token matching `needle` sits directly inside the group
    /// opened by the front token, i.e. at depth exactly 1. Tokens inside
    /// nested groups are not looked at.
    pub fn group_contains(&mut self, needle: impl Fn(&Token) -> bool) -> Result<bool, Error> {
        if !self.peek_kind(0)?.is_open_bracket() {
            return Ok(false);
        }

        let mut depth = 1;
        let mut i = 1;
        loop {
            let token = self.peek(i)?;
            if token.kind.is_open_bracket() {
                depth += 1;
            } else if token.kind.is_close_bracket() {
                depth -= 1;
                if depth == 0 {
                    return Ok(false);
                }
            } else if token.kind == TokenKind::EOF {
                return Ok(false);
            } else if depth == 1 && needle(token) {
                return Ok(true);
            }
            i += 1;
        }
    }

    /// Whether a token matching `needle` appears before the end of the
    /// current line, outside of any bracket. Newlines inside brackets do not
    /// end the line; a close bracket with no matching open ends the scan.
    pub fn line_contains(&mut self, needle: impl Fn(&Token) -> bool) -> Result<bool, Error> {
        let mut depth = 0usize;
        let mut i = 0;
        loop {
            let token = self.peek(i)?;
            match token.kind {
                TokenKind::EOF => return Ok(false),
                TokenKind::Newline if depth == 0 => return Ok(false),
                kind if kind.is_open_bracket() => depth += 1,
                kind if kind.is_close_bracket() => {
                    if depth == 0 {
                        return Ok(false);
                    }
                    depth -= 1;
                }
                _ if depth == 0 && needle(token) => return Ok(true),
                _ => {}
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LookaheadBuffer;
    use crate::{
        errors::errors::ErrorImpl,
        lexer::{
            lexer::Lexer,
            tokens::{Keyword, TokenKind},
        },
    };

    /// A buffer positioned on the first token of `source`.
    fn buffer(source: &str) -> LookaheadBuffer {
        let mut buffer = LookaheadBuffer::new(Lexer::from_source(source, None));
        buffer.skip_newlines().unwrap();
        buffer
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut tokens = buffer("a b c");

        assert_eq!(tokens.peek(2).unwrap().value, "c");
        assert_eq!(tokens.peek(0).unwrap().value, "a");
        assert_eq!(tokens.advance().unwrap().value, "a");
        assert_eq!(tokens.peek(0).unwrap().value, "b");
    }

    #[test]
    fn test_peek_past_end_is_eof() {
        let mut tokens = buffer("a");

        assert_eq!(tokens.peek_kind(5).unwrap(), TokenKind::EOF);
        assert_eq!(tokens.advance().unwrap().value, "a");
    }

    #[test]
    fn test_advance_skipping_newlines() {
        let mut tokens = buffer("a\n\n\nb");

        tokens.advance_skipping_newlines().unwrap();
        assert_eq!(tokens.peek(0).unwrap().value, "b");
    }

    #[test]
    fn test_is_checks_keyword_identity() {
        let mut tokens = buffer("for x in xs");

        assert!(tokens.is(0, |t| t.is_keyword(Keyword::For)).unwrap());
        assert!(tokens.is(2, |t| t.is_keyword(Keyword::In)).unwrap());
        assert!(!tokens.is(1, |t| t.is_keyword(Keyword::In)).unwrap());
    }

    #[test]
    fn test_long_lookahead_grows_buffer() {
        let source = (0..100).map(|i| format!("n{}", i)).collect::<Vec<_>>().join(" ");
        let mut tokens = buffer(&source);

        assert_eq!(tokens.peek(99).unwrap().value, "n99");
        for i in 0..100 {
            assert_eq!(tokens.advance().unwrap().value, format!("n{}", i));
        }
    }

    #[test]
    fn test_group_len() {
        let mut tokens = buffer("(a, [b, c], {d}) e");

        assert_eq!(tokens.group_len(0).unwrap(), 12);
        assert_eq!(tokens.group_len(3).unwrap(), 5);
        assert_eq!(tokens.peek(12).unwrap().value, "e");
    }

    #[test]
    fn test_group_len_mismatched_bracket() {
        let mut tokens = buffer("(a, b]");

        let error = tokens.group_len(0).unwrap_err();
        assert_eq!(
            error.get_impl(),
            &ErrorImpl::UnmatchedBracket {
                bracket: "]".to_string()
            }
        );
    }

    #[test]
    fn test_group_len_unclosed_reports_opening_bracket() {
        let mut tokens = buffer("x = (a,\nb");

        let error = tokens.group_len(2).unwrap_err();
        assert_eq!(error.get_line().column, 4);
        assert!(!error.is_internal());
    }

    #[test]
    fn test_group_len_on_non_bracket_is_internal() {
        let mut tokens = buffer("a");

        assert!(tokens.group_len(0).unwrap_err().is_internal());
    }

    #[test]
    fn test_primary_len() {
        let mut tokens = buffer("a.b[c](d, e).f x");
        assert_eq!(tokens.primary_len(0).unwrap(), Some(11));
        assert_eq!(tokens.peek(11).unwrap().value, "x");

        let mut tokens = buffer("List[Map[String, Int]] names");
        assert_eq!(tokens.primary_len(0).unwrap(), Some(9));

        let mut tokens = buffer("this.x = 1");
        assert_eq!(tokens.primary_len(0).unwrap(), Some(3));

        let mut tokens = buffer("1 + x");
        assert_eq!(tokens.primary_len(0).unwrap(), None);
    }

    #[test]
    fn test_primary_len_stops_at_dangling_dot() {
        let mut tokens = buffer("a. 1");

        assert_eq!(tokens.primary_len(0).unwrap(), Some(1));
    }

    #[test]
    fn test_group_contains_only_sees_depth_one() {
        let mut tokens = buffer("(a, (b, c))");
        let mut commas = 0;
        assert!(tokens.group_contains(|t| t.kind == TokenKind::Comma).unwrap());

        // Only the outer comma is at depth one.
        tokens.advance().unwrap();
        while tokens.peek_kind(0).unwrap() != TokenKind::EOF {
            if tokens.peek_kind(0).unwrap() == TokenKind::Comma {
                commas += 1;
            }
            tokens.advance().unwrap();
        }
        assert_eq!(commas, 2);

        let mut tokens = buffer("(a (b, c))");
        assert!(!tokens.group_contains(|t| t.kind == TokenKind::Comma).unwrap());
    }

    #[test]
    fn test_group_contains_detects_comprehension() {
        let mut tokens = buffer("[x * 2 for x in xs]");
        assert!(tokens.group_contains(|t| t.is_keyword(Keyword::For)).unwrap());

        let mut tokens = buffer("[f([y for y in ys])]");
        assert!(!tokens.group_contains(|t| t.is_keyword(Keyword::For)).unwrap());
    }

    #[test]
    fn test_line_contains() {
        let mut tokens = buffer("a, b = 1, 2\nc = 3");
        assert!(tokens.line_contains(|t| t.kind == TokenKind::Assign).unwrap());

        let mut tokens = buffer("f(a, b)\nc = 3");
        assert!(!tokens.line_contains(|t| t.kind == TokenKind::Assign).unwrap());
    }

    #[test]
    fn test_line_contains_ignores_nested_and_continued_lines() {
        let mut tokens = buffer("f(key = 1,\n  other = 2)\nx = 1");
        assert!(!tokens.line_contains(|t| t.kind == TokenKind::Assign).unwrap());

        let mut tokens = buffer("g(a,\n b) == c");
        assert!(tokens.line_contains(|t| t.is_operator("==")).unwrap());
    }

    #[test]
    fn test_insert_puts_token_back() {
        let mut tokens = buffer("a b");

        let a = tokens.advance().unwrap();
        tokens.insert(0, a).unwrap();
        assert_eq!(tokens.peek(0).unwrap().value, "a");
        assert_eq!(tokens.peek(1).unwrap().value, "b");
    }
}
