use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
    rc::Rc,
};

use tracing::trace;

use crate::{
    errors::errors::{Error, ErrorImpl},
    LineInfo, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, INVALID_PREFIXES, TOKEN_PATTERNS};

/// Pulls tokens one at a time out of a line-oriented source.
///
/// The lexer only ever holds one logical line in memory. When that line is
/// used up it reads the next physical line and keeps appending physical
/// lines while a string, block comment or trailing backslash is still open.
pub struct Lexer {
    source: Box<dyn BufRead>,
    file: Rc<String>,
    /// Current logical line, without its final line break.
    text: Rc<String>,
    /// Bytes of `text` already consumed.
    pos: usize,
    /// Physical line on which `text` starts.
    line_number: usize,
    /// Physical line number of the next unread line.
    next_line: usize,
}

impl Lexer {
    pub fn new(source: impl BufRead + 'static, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer {
            source: Box::new(source),
            file: file_name,
            text: Rc::new(String::new()),
            pos: 0,
            line_number: 0,
            next_line: 1,
        }
    }

    pub fn from_source(source: &str, file: Option<String>) -> Lexer {
        Lexer::new(Cursor::new(source.to_owned()), file)
    }

    pub fn from_path(path: &Path) -> Result<Lexer, Error> {
        let file_name = path.to_string_lossy().into_owned();
        match File::open(path) {
            Ok(file) => Ok(Lexer::new(BufReader::new(file), Some(file_name))),
            Err(error) => Err(Error::new(
                ErrorImpl::Io {
                    message: error.to_string(),
                },
                LineInfo::new(0, Rc::new(String::new()), 0, Rc::new(file_name)),
            )),
        }
    }

    pub fn file(&self) -> Rc<String> {
        Rc::clone(&self.file)
    }

    /// Produces the next significant token.
    ///
    /// A `Newline` token is produced each time a new logical line is started
    /// and `EOF` once the input is exhausted; `EOF` is produced again on
    /// every later call.
    pub fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            if self.pos >= self.text.len() {
                return self.read_logical_line();
            }

            let text = Rc::clone(&self.text);
            let rest = &text[self.pos..];

            if let Some(invalid) = INVALID_PREFIXES.iter().find(|p| p.regex.is_match(rest)) {
                return Err(Error::new(
                    ErrorImpl::KnownInvalidToken {
                        token: invalid.token.to_string(),
                        hint: invalid.hint.to_string(),
                    },
                    self.line_info_at(self.pos),
                ));
            }

            let matched = TOKEN_PATTERNS
                .iter()
                .find_map(|pattern| pattern.regex.find(rest).map(|m| (pattern.kind, m.end())));

            let Some((kind, len)) = matched else {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: rest.chars().next().map(String::from).unwrap_or_default(),
                    },
                    self.line_info_at(self.pos),
                ));
            };

            let line = self.line_info_at(self.pos);
            self.pos += len;

            if kind.is_trivia() {
                continue;
            }

            return Ok(MK_TOKEN!(kind, rest[..len].to_string(), line));
        }
    }

    fn read_logical_line(&mut self) -> Result<Token, Error> {
        let start = self.next_line;

        let Some(mut text) = self.read_physical_line()? else {
            self.pos = self.text.len();
            return Ok(MK_TOKEN!(
                TokenKind::EOF,
                String::from("EOF"),
                self.line_info_at(self.text.len())
            ));
        };

        let mut scanner = ContinuationScanner::default();
        scanner.feed(&text);

        while let Some(open) = scanner.open_construct() {
            match self.read_physical_line()? {
                Some(next) => {
                    text.push('\n');
                    scanner.feed_newline();
                    scanner.feed(&next);
                    text.push_str(&next);
                }
                None => {
                    let (error, at) = match open {
                        OpenConstruct::String => {
                            (ErrorImpl::UnterminatedString, scanner.opened_at)
                        }
                        OpenConstruct::Comment => {
                            (ErrorImpl::UnterminatedComment, scanner.opened_at)
                        }
                        // Reported at the backslash itself.
                        OpenConstruct::Backslash => {
                            (ErrorImpl::ContinuationAtEof, text.len() - 1)
                        }
                    };
                    self.text = Rc::new(text);
                    self.line_number = start;
                    return Err(Error::new(error, self.line_info_at(at)));
                }
            }
        }

        trace!(
            line = start,
            physical_lines = self.next_line - start,
            "read logical line"
        );

        self.text = Rc::new(text);
        self.pos = 0;
        self.line_number = start;

        Ok(MK_TOKEN!(
            TokenKind::Newline,
            String::from("\n"),
            self.line_info_at(0)
        ))
    }

    fn read_physical_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        let read = self.source.read_line(&mut line).map_err(|error| {
            Error::new(
                ErrorImpl::Io {
                    message: error.to_string(),
                },
                self.line_info_at(self.text.len()),
            )
        })?;

        if read == 0 {
            return Ok(None);
        }

        self.next_line += 1;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }

    fn line_info_at(&self, pos: usize) -> LineInfo {
        let consumed = &self.text[..pos];
        LineInfo::new(
            self.line_number + consumed.matches('\n').count(),
            Rc::clone(&self.text),
            consumed.chars().count(),
            Rc::clone(&self.file),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenConstruct {
    String,
    Comment,
    Backslash,
}

/// Tracks, across the physical lines of one logical line, whether a string
/// or block comment is still open.
#[derive(Default)]
struct ContinuationScanner {
    in_string: bool,
    escaped: bool,
    in_block_comment: bool,
    trailing_backslash: bool,
    /// Byte offset, within the logical line, of the construct still open.
    opened_at: usize,
    offset: usize,
}

impl ContinuationScanner {
    fn feed(&mut self, line: &str) {
        let mut chars = line.char_indices().peekable();
        let mut in_line_comment = false;

        while let Some((i, c)) = chars.next() {
            if self.in_block_comment {
                if c == '*' && matches!(chars.peek(), Some((_, '/'))) {
                    chars.next();
                    self.in_block_comment = false;
                }
                continue;
            }

            if self.in_string {
                // A quote only closes the string after an even run of backslashes.
                if self.escaped {
                    self.escaped = false;
                } else if c == '\\' {
                    self.escaped = true;
                } else if c == '"' {
                    self.in_string = false;
                }
                continue;
            }

            match c {
                '"' => {
                    self.in_string = true;
                    self.opened_at = self.offset + i;
                }
                '/' if matches!(chars.peek(), Some((_, '*'))) => {
                    chars.next();
                    self.in_block_comment = true;
                    self.opened_at = self.offset + i;
                }
                '/' if matches!(chars.peek(), Some((_, '/'))) => {
                    in_line_comment = true;
                    break;
                }
                _ => {}
            }
        }

        self.trailing_backslash = !in_line_comment
            && !self.in_string
            && !self.in_block_comment
            && line.ends_with('\\');
        self.offset += line.len();
    }

    fn feed_newline(&mut self) {
        if self.in_string && self.escaped {
            self.escaped = false;
        }
        self.offset += 1;
    }

    fn open_construct(&self) -> Option<OpenConstruct> {
        if self.in_string {
            Some(OpenConstruct::String)
        } else if self.in_block_comment {
            Some(OpenConstruct::Comment)
        } else if self.trailing_backslash {
            Some(OpenConstruct::Backslash)
        } else {
            None
        }
    }
}

/// Lexes a whole source string, up to and including the `EOF` token.
pub fn tokenize(source: &str, file: Option<String>) -> Result<Vec<Token>, Error> {
    let mut lex = Lexer::from_source(source, file);
    let mut tokens = vec![];

    loop {
        let token = lex.next_token()?;
        let done = token.kind == TokenKind::EOF;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// Resolves the escape sequences of a string literal's body (the text
/// between the quotes).
pub fn unescape(literal: &str) -> Result<String, ErrorImpl> {
    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        let Some(next_ch) = chars.peek().copied() else {
            result.push(ch); // Keep the lone backslash
            continue;
        };

        match next_ch {
            'n' => {
                result.push('\n');
                chars.next();
            }
            't' => {
                result.push('\t');
                chars.next();
            }
            '\\' => {
                result.push('\\');
                chars.next();
            }
            'r' => {
                result.push('\r');
                chars.next();
            }
            '"' => {
                result.push('"');
                chars.next();
            }
            '0' => {
                result.push('\0');
                chars.next();
            }
            '\n' => {
                // Escaped line break inside a multi-line string
                chars.next();
            }
            'x' => {
                let mut hex = String::new();
                chars.next();

                for _ in 0..2 {
                    if let Some(ch) = chars.peek() {
                        if ch.is_ascii_hexdigit() {
                            hex.push(*ch);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) if hex.len() == 2 => result.push(byte as char),
                    _ => {
                        return Err(ErrorImpl::InvalidEscape {
                            sequence: format!("\\x{}", hex),
                        })
                    }
                }
            }
            _ => {
                result.push(ch); // Keep the backslash
            }
        }
    }

    Ok(result)
}
