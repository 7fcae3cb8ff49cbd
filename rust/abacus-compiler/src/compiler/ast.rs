//! IR node tree produced by the parser. Pure data: construction and
//! structural traversal only.

use abacus_core::value::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Scope lookup by name.
    GetVar(String),
    /// Dot or bracket access on an evaluated target.
    Access {
        target: Box<Expr>,
        key: AccessKey,
    },
    /// Named function invocation; the callee is resolved at compile time.
    Call {
        name: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Postfix `n!`.
    Factorial(Box<Expr>),
    Ternary {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `target[*]` followed by a per-element access path. When `flatten` is
    /// set, the per-element results (lists themselves) are concatenated one
    /// level.
    Spread {
        target: Box<Expr>,
        tail: Vec<PathStep>,
        flatten: bool,
    },
    /// `target[*].(body)`: the body is evaluated once per element with the
    /// element bound as the scope.
    ComputedSpread {
        target: Box<Expr>,
        body: Box<Expr>,
        flatten: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessKey {
    /// `.name`: the key is a literal string.
    Dot(String),
    /// `[expr]`: the key is any expression.
    Bracket(Box<Expr>),
}

/// One step of a spread tail, applied per element.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    Key(String),
    Index(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    BNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "|^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "not",
            UnaryOp::BNot => "~",
        };
        write!(f, "{}", s)
    }
}
