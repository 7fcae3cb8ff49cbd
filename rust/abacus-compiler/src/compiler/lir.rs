//! Lowered, executable form of an expression.
//!
//! Function names are already resolved to implementation handles, so the
//! runtime never consults the registry. The tree is immutable and shareable
//! across threads; evaluation keeps no state between invocations.

use crate::compiler::ast::{BinOp, UnaryOp};
use abacus_core::functions::FunctionImpl;
use abacus_core::value::Value;
use std::fmt;
use std::sync::Arc;

/// A fully lowered expression: resolution is complete and fixed arities are
/// validated.
pub struct Program {
    pub root: Node,
}

pub enum Node {
    Const(Value),
    GetVar(String),
    /// `.name` access; the key is a fixed string.
    AccessName { target: Box<Node>, key: String },
    /// `[expr]` access; the key is evaluated at run time.
    AccessIndex { target: Box<Node>, key: Box<Node> },
    /// Direct call through a resolved handle. `name` is kept for error
    /// reporting only.
    Call {
        name: String,
        func: Arc<dyn FunctionImpl>,
        args: Vec<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    Factorial(Box<Node>),
    Ternary {
        cond: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },
    Spread {
        target: Box<Node>,
        tail: Vec<TailStep>,
        flatten: bool,
    },
    ComputedSpread {
        target: Box<Node>,
        body: Box<Node>,
        flatten: bool,
    },
}

pub enum TailStep {
    Key(String),
    Index(Node),
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Node::GetVar(name) => f.debug_tuple("GetVar").field(name).finish(),
            Node::AccessName { target, key } => f
                .debug_struct("AccessName")
                .field("target", target)
                .field("key", key)
                .finish(),
            Node::AccessIndex { target, key } => f
                .debug_struct("AccessIndex")
                .field("target", target)
                .field("key", key)
                .finish(),
            Node::Call { name, args, .. } => f
                .debug_struct("Call")
                .field("name", name)
                .field("args", args)
                .finish(),
            Node::Unary { op, operand } => f
                .debug_struct("Unary")
                .field("op", op)
                .field("operand", operand)
                .finish(),
            Node::Binary { op, lhs, rhs } => f
                .debug_struct("Binary")
                .field("op", op)
                .field("lhs", lhs)
                .field("rhs", rhs)
                .finish(),
            Node::Factorial(operand) => f.debug_tuple("Factorial").field(operand).finish(),
            Node::Ternary {
                cond,
                then_branch,
                else_branch,
            } => f
                .debug_struct("Ternary")
                .field("cond", cond)
                .field("then_branch", then_branch)
                .field("else_branch", else_branch)
                .finish(),
            Node::Spread {
                target,
                tail,
                flatten,
            } => f
                .debug_struct("Spread")
                .field("target", target)
                .field("tail", tail)
                .field("flatten", flatten)
                .finish(),
            Node::ComputedSpread {
                target,
                body,
                flatten,
            } => f
                .debug_struct("ComputedSpread")
                .field("target", target)
                .field("body", body)
                .field("flatten", flatten)
                .finish(),
        }
    }
}

impl fmt::Debug for TailStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TailStep::Key(key) => f.debug_tuple("Key").field(key).finish(),
            TailStep::Index(node) => f.debug_tuple("Index").field(node).finish(),
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program").field("root", &self.root).finish()
    }
}
