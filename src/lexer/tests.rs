//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, modifiers and identifiers
//! - Numeric literals (integers, hex and floats)
//! - String literals, including strings spanning several lines
//! - Operators and punctuation, and the order they are tried in
//! - Comments and escaped newlines
//! - Error cases and their reported positions

use super::{
    lexer::{tokenize, unescape, Lexer},
    tokens::{Keyword, Modifier, Token, TokenKind},
};
use crate::errors::errors::ErrorImpl;

fn lex(source: &str) -> Vec<Token> {
    tokenize(source, Some("test.ql".to_string())).unwrap()
}

/// Tokens without the line structure, for checking what is on one line.
fn significant(source: &str) -> Vec<Token> {
    lex(source)
        .into_iter()
        .filter(|token| !token.is_line_end())
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let tokens = significant("class def if else while for in return break continue import as");

    assert_eq!(tokens[0].keyword(), Some(Keyword::Class));
    assert_eq!(tokens[1].keyword(), Some(Keyword::Def));
    assert_eq!(tokens[2].keyword(), Some(Keyword::If));
    assert_eq!(tokens[3].keyword(), Some(Keyword::Else));
    assert_eq!(tokens[4].keyword(), Some(Keyword::While));
    assert_eq!(tokens[5].keyword(), Some(Keyword::For));
    assert_eq!(tokens[6].keyword(), Some(Keyword::In));
    assert_eq!(tokens[7].keyword(), Some(Keyword::Return));
    assert_eq!(tokens[8].keyword(), Some(Keyword::Break));
    assert_eq!(tokens[9].keyword(), Some(Keyword::Continue));
    assert_eq!(tokens[10].keyword(), Some(Keyword::Import));
    assert_eq!(tokens[11].keyword(), Some(Keyword::As));
    assert!(tokens.iter().all(|token| token.kind == TokenKind::Keyword));
}

#[test]
fn test_keywords_do_not_shadow_longer_names() {
    let tokens = significant("index classy iffy define format");

    assert!(tokens.iter().all(|token| token.kind == TokenKind::Name));
    assert_eq!(tokens[0].value, "index");
    assert_eq!(tokens[4].value, "format");
}

#[test]
fn test_tokenize_modifiers_and_markers() {
    let tokens = significant("public static final operator @Override Foo");

    assert_eq!(tokens[0].modifier(), Some(Modifier::Public));
    assert_eq!(tokens[1].modifier(), Some(Modifier::Static));
    assert_eq!(tokens[2].modifier(), Some(Modifier::Final));
    assert_eq!(tokens[3].kind, TokenKind::OperatorDef);
    assert_eq!(tokens[4].kind, TokenKind::Annotation);
    assert_eq!(tokens[4].value, "@Override");
    assert_eq!(tokens[5].kind, TokenKind::Name);
}

#[test]
fn test_tokenize_numbers() {
    let tokens = significant("42 3.14 0xFF 1_000 2e10 1..5");

    assert_eq!(tokens[0].kind, TokenKind::Integer);
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].kind, TokenKind::Integer);
    assert_eq!(tokens[2].value, "0xFF");
    assert_eq!(tokens[3].value, "1_000");
    assert_eq!(tokens[4].kind, TokenKind::Float);
    assert_eq!(tokens[5].kind, TokenKind::Integer);
    assert_eq!(tokens[6].kind, TokenKind::Operator);
    assert_eq!(tokens[6].value, "..");
    assert_eq!(tokens[7].value, "5");
}

#[test]
fn test_tokenize_strings_keep_their_quotes() {
    let tokens = significant(r#""hello" f"x = {x}" "a\"b""#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "\"hello\"");
    assert_eq!(tokens[1].kind, TokenKind::FormatString);
    assert_eq!(tokens[1].value, "f\"x = {x}\"");
    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[2].value, r#""a\"b""#);
}

#[test]
fn test_quote_after_even_backslashes_closes_string() {
    let tokens = significant(r#""a\\" b"#);

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, r#""a\\""#);
    assert_eq!(tokens[1].kind, TokenKind::Name);
}

#[test]
fn test_unescape() {
    assert_eq!(unescape(r"hello\nworld").unwrap(), "hello\nworld");
    assert_eq!(unescape(r"tab\there").unwrap(), "tab\there");
    assert_eq!(unescape(r"backslash\\").unwrap(), "backslash\\");
    assert_eq!(unescape(r"hex\x41").unwrap(), "hexA");
    assert_eq!(unescape(r#"quote\"test"#).unwrap(), "quote\"test");
    assert!(matches!(unescape(r"\xZ"), Err(ErrorImpl::InvalidEscape { .. })));
}

#[test]
fn test_tokenize_operators_longest_spelling_first() {
    let tokens = significant("+ - * / % ** == != < > <= >= = << >> & | ^ ~ ? .. ...");
    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();

    assert_eq!(
        values,
        vec![
            "+", "-", "*", "/", "%", "**", "==", "!=", "<", ">", "<=", ">=", "=", "<<", ">>",
            "&", "|", "^", "~", "?", "..", "..."
        ]
    );
    assert_eq!(tokens[12].kind, TokenKind::Assign);
    assert_eq!(tokens[21].kind, TokenKind::Ellipsis);
}

#[test]
fn test_tokenize_punctuation() {
    let tokens = significant("( ) { } [ ] . , : ->");

    assert_eq!(tokens[0].kind, TokenKind::OpenParen);
    assert_eq!(tokens[1].kind, TokenKind::CloseParen);
    assert_eq!(tokens[2].kind, TokenKind::OpenCurly);
    assert_eq!(tokens[3].kind, TokenKind::CloseCurly);
    assert_eq!(tokens[4].kind, TokenKind::OpenBracket);
    assert_eq!(tokens[5].kind, TokenKind::CloseBracket);
    assert_eq!(tokens[6].kind, TokenKind::Dot);
    assert_eq!(tokens[7].kind, TokenKind::Comma);
    assert_eq!(tokens[8].kind, TokenKind::Colon);
    assert_eq!(tokens[9].kind, TokenKind::Arrow);
}

#[test]
fn test_tokenize_compound_operators() {
    let tokens = significant("++ -- += -= **= <<= x->y");

    assert_eq!(tokens[0].kind, TokenKind::IncDec);
    assert_eq!(tokens[1].kind, TokenKind::IncDec);
    assert_eq!(tokens[2].kind, TokenKind::AugAssign);
    assert_eq!(tokens[3].kind, TokenKind::AugAssign);
    assert_eq!(tokens[4].kind, TokenKind::AugAssign);
    assert_eq!(tokens[4].value, "**=");
    assert_eq!(tokens[5].value, "<<=");
    assert_eq!(tokens[7].kind, TokenKind::Arrow);
}

#[test]
fn test_every_logical_line_starts_with_newline() {
    let tokens = lex("x = 5 // trailing comment\n\ny");
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::Integer,
            TokenKind::Newline,
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::EOF,
        ]
    );
    assert_eq!(tokens[6].line.number, 3);
}

#[test]
fn test_empty_source_is_just_eof() {
    let tokens = lex("");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::EOF);
}

#[test]
fn test_eof_is_repeated() {
    let mut lexer = Lexer::from_source("x", None);

    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Newline);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Name);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EOF);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::EOF);
}

#[test]
fn test_multi_line_string_is_one_token() {
    let tokens = lex("s = \"one\ntwo\nthree\"\nnext = 1");

    let string = tokens
        .iter()
        .find(|token| token.kind == TokenKind::String)
        .unwrap();
    assert_eq!(string.value, "\"one\ntwo\nthree\"");
    assert_eq!(string.line.number, 1);
    assert_eq!(string.line.text.as_str(), "s = \"one\ntwo\nthree\"");

    let next = tokens.iter().find(|token| token.value == "next").unwrap();
    assert_eq!(next.line.number, 4);
    assert_eq!(next.line.column, 0);
}

#[test]
fn test_token_after_multi_line_string_reports_its_physical_line() {
    let tokens = significant("s = \"one\ntwo\" + x");

    assert_eq!(tokens[2].line.number, 1);
    assert_eq!(tokens[3].value, "+");
    assert_eq!(tokens[3].line.number, 2);
    assert_eq!(tokens[3].line.caret_column(), 5);
}

#[test]
fn test_block_comment_spanning_lines_is_skipped() {
    let tokens = lex("a /* one\ntwo */ b\nc");
    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();

    assert_eq!(values, vec!["\n", "a", "b", "\n", "c", "EOF"]);
    assert_eq!(tokens[2].line.number, 2);
    assert_eq!(tokens[4].line.number, 3);
}

#[test]
fn test_escaped_newline_joins_lines() {
    let tokens = lex("x = 1 + \\\n    2\ny");
    let kinds: Vec<TokenKind> = tokens.iter().map(|token| token.kind).collect();

    assert_eq!(
        kinds,
        vec![
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::Integer,
            TokenKind::Operator,
            TokenKind::Integer,
            TokenKind::Newline,
            TokenKind::Name,
            TokenKind::EOF,
        ]
    );
    assert_eq!(tokens[5].line.number, 2);
    assert_eq!(tokens[7].line.number, 3);
}

#[test]
fn test_comment_markers_inside_strings_are_text() {
    let tokens = significant("url = \"http://example.com/*\" + x");

    assert_eq!(tokens[2].kind, TokenKind::String);
    assert_eq!(tokens[3].value, "+");
    assert_eq!(tokens[4].value, "x");
}

#[test]
fn test_unterminated_string_reports_opening_line() {
    let error = tokenize("x = 1\ny = \"abc\nz = 2", Some("test.ql".to_string())).unwrap_err();

    assert_eq!(error.get_impl(), &ErrorImpl::UnterminatedString);
    assert_eq!(error.get_line().number, 2);
    assert_eq!(error.get_line().column, 4);
}

#[test]
fn test_unterminated_block_comment() {
    let error = tokenize("x /* never closed\n", None).unwrap_err();

    assert_eq!(error.get_impl(), &ErrorImpl::UnterminatedComment);
}

#[test]
fn test_line_continuation_at_end_of_file() {
    let error = tokenize("x = 1\ny = 1 + \\\n", None).unwrap_err();

    assert_eq!(error.get_impl(), &ErrorImpl::ContinuationAtEof);
    assert_eq!(error.get_line().number, 2);
    assert_eq!(error.get_line().column, 8);

    let error = tokenize("z = \\\n  2 + \\", None).unwrap_err();
    assert_eq!(error.get_impl(), &ErrorImpl::ContinuationAtEof);
    assert_eq!(error.get_line().number, 2);
    assert_eq!(error.get_line().caret_column(), 6);
}

#[test]
fn test_known_invalid_prefix_gets_specific_message() {
    let error = tokenize("if !done {\n}", None).unwrap_err();

    match error.get_impl() {
        ErrorImpl::KnownInvalidToken { token, hint } => {
            assert_eq!(token, "!");
            assert!(hint.contains("not"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(error.get_line().column, 3);
    assert_eq!(error.get_line().text.as_str(), "if !done {");
}

#[test]
fn test_not_equals_is_not_an_invalid_bang() {
    let tokens = significant("a != b");

    assert_eq!(tokens[1].value, "!=");
}

#[test]
fn test_unrecognised_token() {
    let error = tokenize("x = 1\ny = $", None).unwrap_err();

    assert_eq!(
        error.get_impl(),
        &ErrorImpl::UnrecognisedToken {
            token: "$".to_string()
        }
    );
    assert_eq!(error.get_line().number, 2);
    assert_eq!(error.get_line().column, 4);
}

#[test]
fn test_crlf_line_endings() {
    let tokens = lex("a\r\nb\r\n");
    let values: Vec<&str> = tokens.iter().map(|token| token.value.as_str()).collect();

    assert_eq!(values, vec!["\n", "a", "\n", "b", "EOF"]);
}
