use lazy_static::lazy_static;
use regex::Regex;
use std::{collections::HashMap, fmt::Display};

use crate::{LineInfo, MK_PATTERN};

lazy_static! {
    pub static ref RESERVED_LOOKUP: HashMap<&'static str, Keyword> = {
        let mut map = HashMap::new();
        map.insert("class", Keyword::Class);
        map.insert("def", Keyword::Def);
        map.insert("if", Keyword::If);
        map.insert("else", Keyword::Else);
        map.insert("while", Keyword::While);
        map.insert("for", Keyword::For);
        map.insert("in", Keyword::In);
        map.insert("return", Keyword::Return);
        map.insert("break", Keyword::Break);
        map.insert("continue", Keyword::Continue);
        map.insert("import", Keyword::Import);
        map.insert("as", Keyword::As);
        map.insert("not", Keyword::Not);
        map.insert("and", Keyword::And);
        map.insert("or", Keyword::Or);
        map.insert("is", Keyword::Is);
        map.insert("true", Keyword::True);
        map.insert("false", Keyword::False);
        map.insert("null", Keyword::Null);
        map.insert("this", Keyword::This);
        map.insert("new", Keyword::New);
        map.insert("extends", Keyword::Extends);
        map.insert("implements", Keyword::Implements);
        map
    };

    pub static ref MODIFIER_LOOKUP: HashMap<&'static str, Modifier> = {
        let mut map = HashMap::new();
        map.insert("public", Modifier::Public);
        map.insert("private", Modifier::Private);
        map.insert("protected", Modifier::Protected);
        map.insert("static", Modifier::Static);
        map.insert("final", Modifier::Final);
        map.insert("abstract", Modifier::Abstract);
        map.insert("native", Modifier::Native);
        map
    };

    /// The token catalogue. Tried top to bottom against the unconsumed part of
    /// the logical line; the first entry that matches wins, so every entry
    /// must come before the more general entries that would shadow it.
    pub static ref TOKEN_PATTERNS: Vec<TokenPattern> = vec![
        MK_PATTERN!(TokenKind::Whitespace, r"(?:[ \t\f]|\\\n)+"),
        MK_PATTERN!(TokenKind::Comment, r"(?s:/\*.*?\*/)"),
        MK_PATTERN!(TokenKind::Comment, r"//[^\n]*"),
        MK_PATTERN!(TokenKind::FormatString, r#"(?s:f"(?:[^"\\]|\\.)*")"#),
        MK_PATTERN!(TokenKind::String, r#"(?s:"(?:[^"\\]|\\.)*")"#),
        MK_PATTERN!(
            TokenKind::Float,
            r"[0-9][0-9_]*\.[0-9][0-9_]*(?:[eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+"
        ),
        MK_PATTERN!(TokenKind::Integer, r"0[xX][0-9a-fA-F_]+"),
        MK_PATTERN!(TokenKind::Integer, r"[0-9][0-9_]*"),
        MK_PATTERN!(TokenKind::Keyword, word_alternation(RESERVED_LOOKUP.keys())),
        MK_PATTERN!(TokenKind::Modifier, word_alternation(MODIFIER_LOOKUP.keys())),
        MK_PATTERN!(TokenKind::OperatorDef, r"operator\b"),
        MK_PATTERN!(TokenKind::Annotation, r"@[A-Za-z_][A-Za-z0-9_]*"),
        MK_PATTERN!(TokenKind::Name, r"[A-Za-z_][A-Za-z0-9_]*"),
        MK_PATTERN!(TokenKind::Arrow, r"->"),
        MK_PATTERN!(TokenKind::Ellipsis, r"\.\.\."),
        MK_PATTERN!(TokenKind::OpenParen, r"\("),
        MK_PATTERN!(TokenKind::CloseParen, r"\)"),
        MK_PATTERN!(TokenKind::OpenBracket, r"\["),
        MK_PATTERN!(TokenKind::CloseBracket, r"\]"),
        MK_PATTERN!(TokenKind::OpenCurly, r"\{"),
        MK_PATTERN!(TokenKind::CloseCurly, r"\}"),
        MK_PATTERN!(TokenKind::Comma, ","),
        MK_PATTERN!(TokenKind::Colon, ":"),
        MK_PATTERN!(TokenKind::IncDec, r"\+\+|--"),
        MK_PATTERN!(TokenKind::AugAssign, r"\*\*=|<<=|>>=|[-+*/%&|^]="),
        MK_PATTERN!(TokenKind::Operator, r"\*\*|<<|>>|<=|>=|==|!=|\.\.|[-+*/%<>&|^~?]"),
        MK_PATTERN!(TokenKind::Dot, r"\."),
        MK_PATTERN!(TokenKind::Assign, "="),
    ];

    pub static ref INVALID_PREFIXES: Vec<InvalidPrefix> = vec![
        InvalidPrefix::new(r"!(?:[^=]|$)", "!", "use `not` for logical negation"),
        InvalidPrefix::new(r"&&", "&&", "use `and` for logical conjunction"),
        InvalidPrefix::new(r"\|\|", "||", "use `or` for logical disjunction"),
        InvalidPrefix::new(r"'", "'", "strings are written with double quotes"),
        InvalidPrefix::new(r";", ";", "statements end at the end of the line"),
        InvalidPrefix::new(r"#", "#", "comments start with `//`"),
    ];
}

fn word_alternation<'a>(words: impl Iterator<Item = &'a &'static str>) -> String {
    let mut words: Vec<&str> = words.copied().collect();
    // Longest first keeps the alternation independent of hash order.
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    format!(r"(?:{})\b", words.join("|"))
}

/// A prefix no catalogue entry accepts but that people coming from other
/// languages write anyway. Checked before the catalogue so they get a pointed
/// message instead of the generic one.
pub struct InvalidPrefix {
    pub regex: Regex,
    pub token: &'static str,
    pub hint: &'static str,
}

impl InvalidPrefix {
    fn new(pattern: &str, token: &'static str, hint: &'static str) -> Self {
        InvalidPrefix {
            regex: Regex::new(&format!("^(?:{})", pattern)).unwrap(),
            token,
            hint,
        }
    }
}

pub struct TokenPattern {
    pub kind: TokenKind,
    pub regex: Regex,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    EOF,
    Newline,

    // Discarded by the lexer
    Whitespace,
    Comment,

    Integer,
    Float,
    String,
    FormatString,

    Keyword,
    Modifier,
    OperatorDef, // operator
    Annotation,  // @Name
    Name,

    OpenBracket,
    CloseBracket,
    OpenCurly,
    CloseCurly,
    OpenParen,
    CloseParen,

    Arrow,    // ->
    Ellipsis, // ...
    Comma,
    Colon,
    Dot,
    IncDec,    // ++ --
    AugAssign, // += -= ...
    Operator,
    Assign, // =
}

impl TokenKind {
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_open_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenCurly
        )
    }

    pub fn is_close_bracket(&self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseCurly
        )
    }

    /// The closing bracket for an opening one.
    pub fn closer(&self) -> Option<TokenKind> {
        match self {
            TokenKind::OpenParen => Some(TokenKind::CloseParen),
            TokenKind::OpenBracket => Some(TokenKind::CloseBracket),
            TokenKind::OpenCurly => Some(TokenKind::CloseCurly),
            _ => None,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Keyword {
    Class,
    Def,
    If,
    Else,
    While,
    For,
    In,
    Return,
    Break,
    Continue,
    Import,
    As,
    Not,
    And,
    Or,
    Is,
    True,
    False,
    Null,
    This,
    New,
    Extends,
    Implements,
}

impl Keyword {
    /// Keywords that may appear inside an expression. Any other keyword ends
    /// the expression it follows.
    pub fn is_expression_keyword(&self) -> bool {
        matches!(
            self,
            Keyword::Not
                | Keyword::And
                | Keyword::Or
                | Keyword::Is
                | Keyword::In
                | Keyword::True
                | Keyword::False
                | Keyword::Null
                | Keyword::This
                | Keyword::New
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Native,
}

impl Modifier {
    pub fn is_visibility(&self) -> bool {
        matches!(self, Modifier::Public | Modifier::Private | Modifier::Protected)
    }
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let word = MODIFIER_LOOKUP
            .iter()
            .find(|(_, modifier)| *modifier == self)
            .map(|(word, _)| *word)
            .unwrap_or("?");
        write!(f, "{}", word)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: LineInfo,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EOF => write!(f, "end of file"),
            TokenKind::Newline => write!(f, "end of line"),
            _ => write!(f, "{}", self.value),
        }
    }
}

impl Token {
    pub fn keyword(&self) -> Option<Keyword> {
        if self.kind != TokenKind::Keyword {
            return None;
        }
        RESERVED_LOOKUP.get(self.value.as_str()).copied()
    }

    pub fn modifier(&self) -> Option<Modifier> {
        if self.kind != TokenKind::Modifier {
            return None;
        }
        MODIFIER_LOOKUP.get(self.value.as_str()).copied()
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.keyword() == Some(keyword)
    }

    pub fn is_operator(&self, spelling: &str) -> bool {
        self.kind == TokenKind::Operator && self.value == spelling
    }

    pub fn is_line_end(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::EOF)
    }

    pub fn debug(&self) {
        match self.kind {
            TokenKind::Newline | TokenKind::EOF => {
                println!("{}:{} {}", self.line.number, self.line.column, self.kind)
            }
            _ => println!(
                "{}:{} {} ({})",
                self.line.number, self.line.column, self.kind, self.value
            ),
        }
    }
}
