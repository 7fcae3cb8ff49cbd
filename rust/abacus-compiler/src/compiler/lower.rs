//! IR → executable form.
//!
//! Resolves function names against the supplied registry and validates fixed
//! arities; every other node maps one-to-one onto its lowered counterpart.
//! Scope values are never callable, so an unresolved name is always a
//! compile-time failure.

use crate::compiler::ast::{AccessKey, Expr, PathStep};
use crate::compiler::lir::{Node, Program, TailStep};
use abacus_core::error::Error;
use abacus_core::functions::{Arity, Registry};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CompileError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    #[error("function '{name}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}

impl From<CompileError> for Error {
    fn from(err: CompileError) -> Self {
        Error::compiler(err.to_string())
    }
}

pub fn lower(expr: &Expr, registry: &Registry) -> Result<Program, CompileError> {
    Ok(Program {
        root: lower_node(expr, registry)?,
    })
}

fn lower_node(expr: &Expr, registry: &Registry) -> Result<Node, CompileError> {
    let node = match expr {
        Expr::Literal(value) => Node::Const(value.clone()),
        Expr::GetVar(name) => Node::GetVar(name.clone()),
        Expr::Access { target, key } => {
            let target = Box::new(lower_node(target, registry)?);
            match key {
                AccessKey::Dot(name) => Node::AccessName {
                    target,
                    key: name.clone(),
                },
                AccessKey::Bracket(index) => Node::AccessIndex {
                    target,
                    key: Box::new(lower_node(index, registry)?),
                },
            }
        }
        Expr::Call { name, args } => {
            let func = registry
                .resolve(name)
                .ok_or_else(|| CompileError::UnknownFunction(name.clone()))?
                .clone();
            if let Arity::Fixed(expected) = func.arity() {
                if expected != args.len() {
                    return Err(CompileError::ArityMismatch {
                        name: name.clone(),
                        expected,
                        actual: args.len(),
                    });
                }
            }
            let args = args
                .iter()
                .map(|arg| lower_node(arg, registry))
                .collect::<Result<Vec<_>, _>>()?;
            Node::Call {
                name: name.clone(),
                func,
                args,
            }
        }
        Expr::Unary { op, operand } => Node::Unary {
            op: *op,
            operand: Box::new(lower_node(operand, registry)?),
        },
        Expr::Binary { op, lhs, rhs } => Node::Binary {
            op: *op,
            lhs: Box::new(lower_node(lhs, registry)?),
            rhs: Box::new(lower_node(rhs, registry)?),
        },
        Expr::Factorial(operand) => Node::Factorial(Box::new(lower_node(operand, registry)?)),
        Expr::Ternary {
            cond,
            then_branch,
            else_branch,
        } => Node::Ternary {
            cond: Box::new(lower_node(cond, registry)?),
            then_branch: Box::new(lower_node(then_branch, registry)?),
            else_branch: Box::new(lower_node(else_branch, registry)?),
        },
        Expr::Spread {
            target,
            tail,
            flatten,
        } => Node::Spread {
            target: Box::new(lower_node(target, registry)?),
            tail: tail
                .iter()
                .map(|step| lower_step(step, registry))
                .collect::<Result<Vec<_>, _>>()?,
            flatten: *flatten,
        },
        Expr::ComputedSpread {
            target,
            body,
            flatten,
        } => Node::ComputedSpread {
            target: Box::new(lower_node(target, registry)?),
            body: Box::new(lower_node(body, registry)?),
            flatten: *flatten,
        },
    };
    Ok(node)
}

fn lower_step(step: &PathStep, registry: &Registry) -> Result<TailStep, CompileError> {
    match step {
        PathStep::Key(key) => Ok(TailStep::Key(key.clone())),
        PathStep::Index(index) => Ok(TailStep::Index(lower_node(index, registry)?)),
    }
}
