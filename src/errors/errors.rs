use std::fmt::Display;

use thiserror::Error;

use crate::LineInfo;

/// Which side of the fence an error falls on: malformed source, or a broken
/// invariant inside the parser itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Internal,
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "SyntaxError"),
            ErrorCategory::Internal => write!(f, "InternalError"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    line: LineInfo,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, line: LineInfo) -> Self {
        Error {
            internal_error: error_impl,
            line,
        }
    }

    pub fn get_line(&self) -> &LineInfo {
        &self.line
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn category(&self) -> ErrorCategory {
        self.internal_error.category()
    }

    pub fn is_internal(&self) -> bool {
        self.category() == ErrorCategory::Internal
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::KnownInvalidToken { .. } => "KnownInvalidToken",
            ErrorImpl::UnterminatedString => "UnterminatedString",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::ContinuationAtEof => "ContinuationAtEof",
            ErrorImpl::InvalidEscape { .. } => "InvalidEscape",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::MalformedFormatString { .. } => "MalformedFormatString",
            ErrorImpl::IllegalToken { .. } => "IllegalToken",
            ErrorImpl::UnmatchedBracket { .. } => "UnmatchedBracket",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::DuplicateModifier { .. } => "DuplicateModifier",
            ErrorImpl::IllegalModifier { .. } => "IllegalModifier",
            ErrorImpl::DanglingAnnotation => "DanglingAnnotation",
            ErrorImpl::Io { .. } => "Io",
            ErrorImpl::IllegalPostfixOperator { .. } => "IllegalPostfixOperator",
            ErrorImpl::MissingOperand { .. } => "MissingOperand",
            ErrorImpl::NotABracket { .. } => "NotABracket",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::KnownInvalidToken { hint, .. } => ErrorTip::Suggestion(hint.clone()),
            ErrorImpl::UnterminatedString => ErrorTip::Suggestion(String::from(
                "a string is closed by a `\"` that is not escaped",
            )),
            ErrorImpl::UnterminatedComment => {
                ErrorTip::Suggestion(String::from("close the block comment with `*/`"))
            }
            ErrorImpl::ContinuationAtEof => {
                ErrorTip::Suggestion(String::from("remove the trailing `\\`"))
            }
            ErrorImpl::InvalidEscape { .. } => ErrorTip::Suggestion(String::from(
                "`\\x` must be followed by two hex digits",
            )),
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnexpectedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedTokenDetailed { .. } => ErrorTip::None,
            ErrorImpl::MalformedFormatString { .. } => ErrorTip::None,
            ErrorImpl::IllegalToken { .. } => ErrorTip::None,
            ErrorImpl::UnmatchedBracket { .. } => ErrorTip::None,
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "only names, members and indexed values can be assigned to",
            )),
            ErrorImpl::DuplicateModifier { modifier } => {
                ErrorTip::Suggestion(format!("remove the second `{}`", modifier))
            }
            ErrorImpl::IllegalModifier { .. } => ErrorTip::None,
            ErrorImpl::DanglingAnnotation => ErrorTip::Suggestion(String::from(
                "annotations must be followed by a class, def, operator or declaration",
            )),
            ErrorImpl::Io { .. } => ErrorTip::None,
            ErrorImpl::IllegalPostfixOperator { .. }
            | ErrorImpl::MissingOperand { .. }
            | ErrorImpl::NotABracket { .. } => {
                ErrorTip::Suggestion(String::from("this is a bug in the parser, not in your code"))
            }
        }
    }
}

impl Display for Error {
    /// Renders the message, the offending logical line and a caret under the
    /// column:
    ///
    /// ```text
    /// SyntaxError: illegal token ")" (main.ql:3:10)
    /// x = (1 + )
    ///          ^
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}: {} ({})", self.category(), self.internal_error, self.line)?;
        if let ErrorTip::Suggestion(tip) = self.get_tip() {
            writeln!(f, "  tip: {}", tip)?;
        }
        writeln!(f, "{}", self.line.text)?;
        write!(f, "{}^", " ".repeat(self.line.caret_column()))
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("invalid token: {token:?}")]
    KnownInvalidToken { token: String, hint: String },
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("line continuation at end of file")]
    ContinuationAtEof,
    #[error("invalid escape sequence: {sequence:?}")]
    InvalidEscape { sequence: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("expected {expected}, found {found:?}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("malformed format string: {message}")]
    MalformedFormatString { message: String },
    #[error("illegal token {token:?}")]
    IllegalToken { token: String },
    #[error("unmatched bracket {bracket:?}")]
    UnmatchedBracket { bracket: String },
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("duplicate modifier {modifier:?}")]
    DuplicateModifier { modifier: String },
    #[error("illegal modifier {modifier:?}: {reason}")]
    IllegalModifier { modifier: String, reason: String },
    #[error("annotation is not attached to a declaration")]
    DanglingAnnotation,
    #[error("failed to read source: {message}")]
    Io { message: String },
    #[error("illegal postfix operator {operator:?}")]
    IllegalPostfixOperator { operator: String },
    #[error("operator {operator:?} has no operand to fold")]
    MissingOperand { operator: String },
    #[error("structural scan started on {token:?}, which is not an open bracket")]
    NotABracket { token: String },
}

impl ErrorImpl {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorImpl::IllegalPostfixOperator { .. }
            | ErrorImpl::MissingOperand { .. }
            | ErrorImpl::NotABracket { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Syntax,
        }
    }
}
