use std::fmt::Display;

use crate::LineInfo;

use super::types::TypeRef;

// OPERATORS

/// Every operator the expression parser knows. Precedence and fixity live in
/// the parser's operator table; an operator here is only an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Power,
    Unwrap,
    Negate,
    BitNot,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitXor,
    BitOr,
    Range,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
    Is,
    In,
    Not,
    And,
    Or,
    Spread,
}

impl Operator {
    pub fn spelling(&self) -> &'static str {
        match self {
            Operator::Power => "**",
            Operator::Unwrap => "?",
            Operator::Negate => "-",
            Operator::BitNot => "~",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::ShiftLeft => "<<",
            Operator::ShiftRight => ">>",
            Operator::BitAnd => "&",
            Operator::BitXor => "^",
            Operator::BitOr => "|",
            Operator::Range => "..",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Is => "is",
            Operator::In => "in",
            Operator::Not => "not",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Spread => "...",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.spelling())
    }
}

// LITERALS

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// A call or `new` argument, optionally passed by name (`f(x, key=1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

/// One piece of a format string: literal text or an interpolated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatPart {
    Text(String),
    Expr(Expr),
}

/// Expression node.
///
/// `Binary` is n-ary: a run of the same operator at the same precedence,
/// like `a + b + c`, is one node with three operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: LineInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    This,
    Unary {
        operator: Operator,
        operand: Box<Expr>,
    },
    Binary {
        operator: Operator,
        operands: Vec<Expr>,
    },
    Postfix {
        operator: Operator,
        operand: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Argument>,
    },
    Index {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },
    Member {
        target: Box<Expr>,
        name: String,
    },
    /// `then_value if condition else else_value`
    Ternary {
        then_value: Box<Expr>,
        condition: Box<Expr>,
        else_value: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Map(Vec<(Expr, Expr)>),
    /// `[element for variable in iterable if condition]`
    Comprehension {
        element: Box<Expr>,
        variable: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
    },
    New {
        ty: TypeRef,
        arguments: Vec<Argument>,
    },
    FormatString(Vec<FormatPart>),
}

impl Expr {
    pub fn new(kind: ExprKind, line: LineInfo) -> Self {
        Expr { kind, line }
    }

    /// Whether the expression can stand on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Name(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Display for Argument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}={}", name, self.value),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Renders the tree as an s-expression, e.g. `1 + 2 * 3` as
/// `(+ 1 (* 2 3))`.
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Literal(Literal::Integer(value)) => write!(f, "{}", value),
            ExprKind::Literal(Literal::Float(value)) => write!(f, "{:?}", value),
            ExprKind::Literal(Literal::String(value)) => write!(f, "{:?}", value),
            ExprKind::Literal(Literal::Boolean(value)) => write!(f, "{}", value),
            ExprKind::Literal(Literal::Null) => write!(f, "null"),
            ExprKind::Name(name) => write!(f, "{}", name),
            ExprKind::This => write!(f, "this"),
            ExprKind::Unary { operator, operand } | ExprKind::Postfix { operator, operand } => {
                write!(f, "({} {})", operator, operand)
            }
            ExprKind::Binary { operator, operands } => {
                write!(f, "({} {})", operator, join(operands))
            }
            ExprKind::Call { callee, arguments } => {
                if arguments.is_empty() {
                    write!(f, "(call {})", callee)
                } else {
                    write!(f, "(call {} {})", callee, join(arguments))
                }
            }
            ExprKind::Index { target, indices } => {
                write!(f, "(index {} {})", target, join(indices))
            }
            ExprKind::Member { target, name } => write!(f, "(. {} {})", target, name),
            ExprKind::Ternary {
                then_value,
                condition,
                else_value,
            } => write!(f, "(if {} {} {})", condition, then_value, else_value),
            ExprKind::Tuple(items) => write!(f, "(tuple {})", join(items)),
            ExprKind::List(items) => write!(f, "[{}]", join(items)),
            ExprKind::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect();
                write!(f, "{{{}}}", entries.join(", "))
            }
            ExprKind::Comprehension {
                element,
                variable,
                iterable,
                condition,
            } => match condition {
                Some(condition) => write!(
                    f,
                    "(for {} {} {} {})",
                    variable, iterable, element, condition
                ),
                None => write!(f, "(for {} {} {})", variable, iterable, element),
            },
            ExprKind::New { ty, arguments } => {
                if arguments.is_empty() {
                    write!(f, "(new {})", ty)
                } else {
                    write!(f, "(new {} {})", ty, join(arguments))
                }
            }
            ExprKind::FormatString(parts) => {
                write!(f, "(format")?;
                for part in parts {
                    match part {
                        FormatPart::Text(text) => write!(f, " {:?}", text)?,
                        FormatPart::Expr(expr) => write!(f, " {}", expr)?,
                    }
                }
                write!(f, ")")
            }
        }
    }
}
