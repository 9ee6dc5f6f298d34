//! Integration tests for the front end.
//!
//! These tests go through the public API only: source files on disk or in
//! memory are lexed lazily, parsed into a module, and errors are rendered the
//! way the command line tool prints them.

use std::fs;

use quill::{
    ast::statements::StmtKind,
    errors::errors::{ErrorCategory, ErrorImpl},
    lexer::lexer::tokenize,
    parse_file, parse_source,
};

const PROGRAM: &str = r#"import std.io as io

// A small program touching most of the grammar.
@Doc("2D point")
public class Point extends Shape implements Eq {
    private Int x = 0
    private Int y = 0

    def length() -> Float {
        return (this.x ** 2 + this.y ** 2) ** 0.5
    }

    operator +(Point other) -> Point {
        return new Point(x=this.x + other.x, y=this.y + other.y)
    }

    abstract def area() -> Float
}

List[Int] squares = [n * n for n in 0..10 if n % 2 == 0]
Int total, count = 0, 0
for square in squares {
    total += square
    count++
}

/* the summary
   spans lines */
String message = f"total {total} over {count} values"
if count > 0 and not quiet {
    io.print(message)
} else {
    io.print("nothing to do")
}
"#;

#[test]
fn test_parse_program_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("program.ql");
    fs::write(&path, PROGRAM).expect("write source");

    let module = parse_file(&path).expect("program parses");

    assert_eq!(module.file.as_str(), path.to_string_lossy());
    let kinds: Vec<&str> = module
        .iter()
        .map(|stmt| match stmt.kind {
            StmtKind::Import { .. } => "import",
            StmtKind::Class(_) => "class",
            StmtKind::Declaration(_) => "declaration",
            StmtKind::Assign { .. } => "assign",
            StmtKind::For { .. } => "for",
            StmtKind::If { .. } => "if",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["import", "class", "declaration", "assign", "for", "declaration", "if"]
    );

    let StmtKind::Class(class) = &module.body[1].kind else {
        panic!("expected a class");
    };
    assert_eq!(class.decorations.annotations[0].name, "Doc");
    assert_eq!(class.body.body.len(), 5);
    assert_eq!(module.body[1].line.number, 5);
    assert_eq!(module.body[5].line.number, 29);
}

#[test]
fn test_parse_file_reports_error_position() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.ql");
    fs::write(&path, "x = 1\ny = \"ok\nstill ok\"\nz = (1 + )\n").expect("write source");

    let error = parse_file(&path).expect_err("source is malformed");

    assert_eq!(error.category(), ErrorCategory::Syntax);
    assert_eq!(error.get_line().number, 4);
    assert_eq!(error.get_line().column, 9);
    assert_eq!(error.get_line().file.as_str(), path.to_string_lossy());
}

#[test]
fn test_parse_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let error = parse_file(dir.path().join("absent.ql")).expect_err("file does not exist");

    assert!(matches!(error.get_impl(), ErrorImpl::Io { .. }));
}

#[test]
fn test_error_rendering() {
    let error = parse_source("x = (1 + )", Some("test.ql".to_string())).expect_err("malformed");

    assert_eq!(
        error.to_string(),
        "SyntaxError: illegal token \")\" (test.ql:1:10)\nx = (1 + )\n         ^"
    );
}

#[test]
fn test_error_rendering_with_tip() {
    let error = parse_source("if a && b {\n}", None).expect_err("malformed");

    let rendered = error.to_string();
    assert!(rendered.starts_with("SyntaxError: invalid token: \"&&\" (shell:1:6)"));
    assert!(rendered.contains("tip: use `and` for logical conjunction"));
    assert!(rendered.ends_with("if a && b {\n     ^"));
}

#[test]
fn test_error_caret_under_multi_line_string() {
    let error = parse_source("s = \"one\ntwo\" + !x", None).expect_err("malformed");

    assert_eq!(error.get_line().number, 2);
    assert!(error.to_string().ends_with("s = \"one\ntwo\" + !x\n       ^"));
}

#[test]
fn test_unterminated_string_reports_opening_line() {
    let error = parse_source("x = 1\ny = \"never\nclosed\n", None).expect_err("malformed");

    assert_eq!(error.get_impl(), &ErrorImpl::UnterminatedString);
    assert_eq!(error.get_line().number, 2);
}

#[test]
fn test_tokenize_and_parse_agree_on_lines() {
    let source = "a = 1\n\nb = \"x\ny\"\nc = 2";
    let tokens = tokenize(source, None).expect("lexes");
    let module = parse_source(source, None).expect("parses");

    let token_lines: Vec<usize> = tokens
        .iter()
        .filter(|token| token.kind == quill::lexer::tokens::TokenKind::Name)
        .map(|token| token.line.number)
        .collect();
    let stmt_lines: Vec<usize> = module.iter().map(|stmt| stmt.line.number).collect();

    assert_eq!(token_lines, stmt_lines);
}
