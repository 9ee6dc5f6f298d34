//! Utility macros for the front end.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_PATTERN!` - Creates an anchored entry of the token catalogue

/// Creates a Token instance.
///
/// # Arguments
///
/// * `$kind` - The TokenKind
/// * `$value` - The token's literal text
/// * `$line` - The token's `LineInfo`
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::Integer, "42".to_string(), line);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $line:expr) => {
        Token {
            kind: $kind,
            value: $value,
            line: $line,
        }
    };
}

/// Creates a catalogue entry whose regex only matches at the scan position.
///
/// The pattern is wrapped in `^(?:...)`, so alternations inside it stay
/// anchored as a whole.
///
/// # Example
///
/// ```ignore
/// MK_PATTERN!(TokenKind::Arrow, "->")
/// ```
#[macro_export]
macro_rules! MK_PATTERN {
    ($kind:expr, $pattern:expr) => {
        TokenPattern {
            kind: $kind,
            regex: Regex::new(&format!("^(?:{})", $pattern)).unwrap(),
        }
    };
}
