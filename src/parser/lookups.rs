use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::{
    ast::{
        expressions::Operator,
        statements::{Decorations, Stmt},
    },
    errors::errors::Error,
    lexer::tokens::{Keyword, Token, TokenKind},
};

use super::{parser::Parser, stmt::*};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Fixity {
    Prefix,
    Infix,
    Postfix,
}

/// One meaning of an operator spelling. Lower precedence binds tighter.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OperatorInfo {
    pub operator: Operator,
    pub precedence: u8,
    pub fixity: Fixity,
}

/// Everything a spelling can mean. `-` is both prefix and infix; which one
/// applies depends only on whether the parser is expecting an operand.
#[derive(Debug, Default, Clone, Copy)]
pub struct OperatorEntry {
    pub prefix: Option<OperatorInfo>,
    pub infix: Option<OperatorInfo>,
    pub postfix: Option<OperatorInfo>,
}

pub type StmtHandler = fn(&mut Parser, Decorations) -> Result<Stmt, Error>;

fn register(
    map: &mut HashMap<&'static str, OperatorEntry>,
    spelling: &'static str,
    operator: Operator,
    precedence: u8,
    fixity: Fixity,
) {
    let info = Some(OperatorInfo {
        operator,
        precedence,
        fixity,
    });
    let entry = map.entry(spelling).or_default();
    match fixity {
        Fixity::Prefix => entry.prefix = info,
        Fixity::Infix => entry.infix = info,
        Fixity::Postfix => entry.postfix = info,
    }
}

lazy_static! {
    pub static ref OPERATOR_LOOKUP: HashMap<&'static str, OperatorEntry> = {
        let mut map = HashMap::new();
        register(&mut map, "**", Operator::Power, 1, Fixity::Infix);
        register(&mut map, "?", Operator::Unwrap, 1, Fixity::Postfix);

        register(&mut map, "-", Operator::Negate, 2, Fixity::Prefix);
        register(&mut map, "~", Operator::BitNot, 2, Fixity::Prefix);

        register(&mut map, "*", Operator::Multiply, 3, Fixity::Infix);
        register(&mut map, "/", Operator::Divide, 3, Fixity::Infix);
        register(&mut map, "%", Operator::Modulo, 3, Fixity::Infix);

        register(&mut map, "+", Operator::Add, 4, Fixity::Infix);
        register(&mut map, "-", Operator::Subtract, 4, Fixity::Infix);

        register(&mut map, "<<", Operator::ShiftLeft, 5, Fixity::Infix);
        register(&mut map, ">>", Operator::ShiftRight, 5, Fixity::Infix);

        register(&mut map, "&", Operator::BitAnd, 6, Fixity::Infix);
        register(&mut map, "^", Operator::BitXor, 7, Fixity::Infix);
        register(&mut map, "|", Operator::BitOr, 8, Fixity::Infix);

        register(&mut map, "..", Operator::Range, 9, Fixity::Infix);

        // Comparisons
        register(&mut map, "<", Operator::Less, 10, Fixity::Infix);
        register(&mut map, "<=", Operator::LessEqual, 10, Fixity::Infix);
        register(&mut map, ">", Operator::Greater, 10, Fixity::Infix);
        register(&mut map, ">=", Operator::GreaterEqual, 10, Fixity::Infix);
        register(&mut map, "==", Operator::Equal, 10, Fixity::Infix);
        register(&mut map, "!=", Operator::NotEqual, 10, Fixity::Infix);
        register(&mut map, "is", Operator::Is, 10, Fixity::Infix);
        register(&mut map, "in", Operator::In, 10, Fixity::Infix);

        // Logical
        register(&mut map, "not", Operator::Not, 11, Fixity::Prefix);
        register(&mut map, "and", Operator::And, 12, Fixity::Infix);
        register(&mut map, "or", Operator::Or, 13, Fixity::Infix);

        register(&mut map, "...", Operator::Spread, 14, Fixity::Postfix);
        map
    };

    pub static ref AUG_ASSIGN_LOOKUP: HashMap<&'static str, Operator> = {
        let mut map = HashMap::new();
        map.insert("+=", Operator::Add);
        map.insert("-=", Operator::Subtract);
        map.insert("*=", Operator::Multiply);
        map.insert("/=", Operator::Divide);
        map.insert("%=", Operator::Modulo);
        map.insert("**=", Operator::Power);
        map.insert("&=", Operator::BitAnd);
        map.insert("|=", Operator::BitOr);
        map.insert("^=", Operator::BitXor);
        map.insert("<<=", Operator::ShiftLeft);
        map.insert(">>=", Operator::ShiftRight);
        map
    };

    /// Statements introduced by a keyword. `this` and the other expression
    /// keywords are not here; lines starting with them are expressions or
    /// assignments.
    pub static ref STMT_LOOKUP: HashMap<Keyword, StmtHandler> = {
        let mut map: HashMap<Keyword, StmtHandler> = HashMap::new();
        map.insert(Keyword::Class, parse_class_decl_stmt);
        map.insert(Keyword::Def, parse_function_decl_stmt);
        map.insert(Keyword::If, parse_if_stmt);
        map.insert(Keyword::While, parse_while_stmt);
        map.insert(Keyword::For, parse_for_stmt);
        map.insert(Keyword::Return, parse_return_stmt);
        map.insert(Keyword::Break, parse_break_stmt);
        map.insert(Keyword::Continue, parse_continue_stmt);
        map.insert(Keyword::Import, parse_import_stmt);
        map
    };
}

/// The operator entry a token spells, if any. Word operators are keyword
/// tokens and `...` is lexed as an ellipsis.
pub fn operator_entry(token: &Token) -> Option<&'static OperatorEntry> {
    match token.kind {
        TokenKind::Operator | TokenKind::Ellipsis => OPERATOR_LOOKUP.get(token.value.as_str()),
        TokenKind::Keyword => match token.keyword()? {
            Keyword::Not | Keyword::And | Keyword::Or | Keyword::Is | Keyword::In => {
                OPERATOR_LOOKUP.get(token.value.as_str())
            }
            _ => None,
        },
        _ => None,
    }
}

/// Whether a keyword introduces a declaration that modifiers and
/// annotations may attach to.
pub fn is_declaration_keyword(keyword: Keyword) -> bool {
    matches!(keyword, Keyword::Class | Keyword::Def)
}
