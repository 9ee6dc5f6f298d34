use crate::{lexer::tokens::Modifier, LineInfo};

use super::{
    expressions::{Argument, Expr, Operator},
    types::TypeRef,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub body: Vec<Stmt>,
    pub line: LineInfo,
}

/// `@Name` or `@Name(args)` written on the lines before a declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub arguments: Vec<Argument>,
    pub line: LineInfo,
}

/// Annotations and modifiers collected ahead of a declaration. They are
/// gathered first and handed to the declaration when it is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decorations {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
}

impl Decorations {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

/// `Type name` or `Type name = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub decorations: Decorations,
    pub ty: TypeRef,
    pub name: String,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: TypeRef,
    pub name: String,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionName {
    Named(String),
    /// `operator +(...)`, by the operator's spelling.
    Operator(String),
}

/// A `def` or `operator` definition. `body` is `None` for a signature-only
/// declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub decorations: Decorations,
    pub name: FunctionName,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeRef>,
    pub body: Option<Block>,
}

impl FunctionDecl {
    pub fn is_signature_only(&self) -> bool {
        self.body.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub decorations: Decorations,
    pub name: String,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub body: Block,
}

/// One target of a (possibly multi-target) assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Expr(Expr),
    Declared { ty: TypeRef, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: LineInfo,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: LineInfo) -> Self {
        Stmt { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Expression(Expr),
    /// `a = 1`, `a, b = 1, 2`, `Int a, b = f()`
    Assign {
        targets: Vec<AssignTarget>,
        values: Vec<Expr>,
    },
    /// `a += 1`; `operator` is the binary operator applied.
    AugAssign {
        target: Expr,
        operator: Operator,
        value: Expr,
    },
    IncDec {
        target: Expr,
        increment: bool,
    },
    Declaration(Declaration),
    Function(FunctionDecl),
    Class(ClassDecl),
    If {
        branches: Vec<(Expr, Block)>,
        otherwise: Option<Block>,
    },
    While {
        condition: Expr,
        body: Block,
    },
    For {
        variable: String,
        iterable: Expr,
        body: Block,
    },
    Return(Vec<Expr>),
    Break,
    Continue,
    Import {
        path: Vec<String>,
        alias: Option<String>,
    },
}
