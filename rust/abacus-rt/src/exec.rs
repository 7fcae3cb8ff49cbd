//! Evaluator: walks a lowered expression against a scope.
//!
//! Arithmetic and short-circuit paths do not allocate; list construction
//! (spreads) and string production are the only allocating operations.

use abacus_compiler::compiler::ast::{BinOp, UnaryOp};
use abacus_compiler::compiler::lir::{Node, Program, TailStep};
use abacus_core::error::Error;
use abacus_core::functions::RegistryId;
use abacus_core::value::Value;
use std::cmp::Ordering;
use std::sync::Arc;

/// A compiled, reusable expression artifact.
///
/// Immutable and cheap to clone (the program is shared behind an `Arc`);
/// a single instance may be applied concurrently with distinct scopes.
#[derive(Clone, Debug)]
pub struct CompiledExpr {
    program: Arc<Program>,
    registry_id: RegistryId,
}

impl CompiledExpr {
    pub(crate) fn new(program: Program, registry_id: RegistryId) -> Self {
        Self {
            program: Arc::new(program),
            registry_id,
        }
    }

    /// The registry this artifact was compiled against.
    pub fn registry_id(&self) -> RegistryId {
        self.registry_id
    }

    /// Evaluate against `scope`. The scope must be a Map or Struct at the
    /// top level; no state is kept between invocations.
    pub fn apply(&self, scope: &Value) -> Result<Value, Error> {
        if !matches!(scope, Value::Map(_) | Value::Struct(_)) {
            return Err(Error::runtime(format!(
                "scope must be a Map or Struct, got {}",
                scope.type_name()
            )));
        }
        eval(&self.program.root, scope)
    }
}

fn eval(node: &Node, scope: &Value) -> Result<Value, Error> {
    match node {
        Node::Const(value) => Ok(value.clone()),
        Node::GetVar(name) => get_var(scope, name),
        Node::AccessName { target, key } => {
            let target = eval(target, scope)?;
            access_name(&target, key)
        }
        Node::AccessIndex { target, key } => {
            let target = eval(target, scope)?;
            let key = eval(key, scope)?;
            access_index(&target, &key)
        }
        Node::Call { func, args, .. } => {
            let mut evaluated = Vec::with_capacity(args.len());
            for arg in args {
                evaluated.push(eval(arg, scope)?);
            }
            func.invoke(&evaluated)
        }
        Node::Unary { op, operand } => {
            let value = eval(operand, scope)?;
            apply_unary(*op, &value)
        }
        Node::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, scope),
        Node::Factorial(operand) => {
            let value = eval(operand, scope)?;
            factorial(&value)
        }
        Node::Ternary {
            cond,
            then_branch,
            else_branch,
        } => {
            // Only the selected branch is evaluated.
            if eval(cond, scope)?.is_truthy() {
                eval(then_branch, scope)
            } else {
                eval(else_branch, scope)
            }
        }
        Node::Spread {
            target,
            tail,
            flatten,
        } => {
            let target = eval(target, scope)?;
            let items = spread_items(&target)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let mut current = item.clone();
                for step in tail {
                    current = apply_tail_step(&current, step, scope)?;
                }
                out.push(current);
            }
            if *flatten {
                out = flatten_one(out);
            }
            Ok(Value::list(out))
        }
        Node::ComputedSpread {
            target,
            body,
            flatten,
        } => {
            let target = eval(target, scope)?;
            let items = spread_items(&target)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                // The element shadows the active scope binding.
                out.push(eval(body, item)?);
            }
            if *flatten {
                out = flatten_one(out);
            }
            Ok(Value::list(out))
        }
    }
}

// -- Scope and access ------------------------------------------------------

fn get_var(scope: &Value, name: &str) -> Result<Value, Error> {
    let found = match scope {
        Value::Map(entries) => entries.get(name).cloned(),
        // Existing-keys-only: the lookup never mints a new interned key.
        Value::Struct(fields) => fields.get_named(name).cloned(),
        _ => None,
    };
    found.ok_or_else(|| Error::runtime(format!("variable not found: {}", name)))
}

fn access_miss() -> Error {
    Error::runtime("Access failed: key not found")
}

fn access_name(target: &Value, key: &str) -> Result<Value, Error> {
    match target {
        Value::Map(entries) => entries.get(key).cloned().ok_or_else(access_miss),
        Value::Struct(fields) => fields.get_named(key).cloned().ok_or_else(access_miss),
        other => Err(Error::runtime(format!(
            "cannot access '{}' on {}",
            key,
            other.type_name()
        ))),
    }
}

fn access_index(target: &Value, key: &Value) -> Result<Value, Error> {
    match (target, key) {
        (Value::List(items), Value::Int(index)) => usize::try_from(*index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .ok_or_else(|| {
                Error::runtime(format!(
                    "index {} out of bounds for list of length {}",
                    index,
                    items.len()
                ))
            }),
        (Value::Map(entries), Value::String(key)) => {
            entries.get(key.as_ref()).cloned().ok_or_else(access_miss)
        }
        (Value::Struct(fields), Value::String(key)) => {
            fields.get_named(key).cloned().ok_or_else(access_miss)
        }
        (target, key) => Err(Error::runtime(format!(
            "cannot index {} with {}",
            target.type_name(),
            key.type_name()
        ))),
    }
}

// -- Spreads ---------------------------------------------------------------

fn spread_items(target: &Value) -> Result<&[Value], Error> {
    target.as_list().ok_or_else(|| {
        Error::runtime(format!(
            "spread target must be a List, got {}",
            target.type_name()
        ))
    })
}

/// Per-element path step. Misses yield `Null` rather than an error so that
/// aggregates over ragged data stay forgiving; only a failing index
/// *expression* propagates an error.
fn apply_tail_step(value: &Value, step: &TailStep, scope: &Value) -> Result<Value, Error> {
    match step {
        TailStep::Key(key) => Ok(lenient_key(value, key)),
        TailStep::Index(node) => {
            let key = eval(node, scope)?;
            Ok(lenient_index(value, &key))
        }
    }
}

fn lenient_key(value: &Value, key: &str) -> Value {
    match value {
        Value::Map(entries) => entries.get(key).cloned().unwrap_or(Value::Null),
        Value::Struct(fields) => fields.get_named(key).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn lenient_index(value: &Value, key: &Value) -> Value {
    match (value, key) {
        (Value::List(items), Value::Int(index)) => usize::try_from(*index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        (Value::Map(entries), Value::String(key)) => {
            entries.get(key.as_ref()).cloned().unwrap_or(Value::Null)
        }
        (Value::Struct(fields), Value::String(key)) => {
            fields.get_named(key).cloned().unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

/// Concatenate one level: list children are spliced, anything else is kept
/// as a single element.
fn flatten_one(items: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::List(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other),
        }
    }
    out
}

// -- Operators -------------------------------------------------------------

fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, Error> {
    match op {
        UnaryOp::Neg => match value {
            Value::Int(n) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| Error::runtime("integer overflow in '-'")),
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Err(Error::runtime(format!(
                "unsupported operand for '-': {}",
                other.type_name()
            ))),
        },
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::BNot => match value {
            Value::Int(n) => Ok(Value::Int(!n)),
            other => Err(Error::runtime(format!(
                "bitwise '~' requires an integer operand, got {}",
                other.type_name()
            ))),
        },
    }
}

fn eval_binary(op: BinOp, lhs: &Node, rhs: &Node, scope: &Value) -> Result<Value, Error> {
    // && and || short-circuit; everything else evaluates both sides.
    match op {
        BinOp::And => {
            if !eval(lhs, scope)?.is_truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(eval(rhs, scope)?.is_truthy()));
        }
        BinOp::Or => {
            if eval(lhs, scope)?.is_truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(eval(rhs, scope)?.is_truthy()));
        }
        _ => {}
    }
    let lhs = eval(lhs, scope)?;
    let rhs = eval(rhs, scope)?;
    apply_binary(op, &lhs, &rhs)
}

fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    match op {
        BinOp::Add => arith(op, lhs, rhs, i64::checked_add, |x, y| x + y),
        BinOp::Sub => arith(op, lhs, rhs, i64::checked_sub, |x, y| x - y),
        BinOp::Mul => arith(op, lhs, rhs, i64::checked_mul, |x, y| x * y),
        BinOp::Div => {
            let x = expect_number(op, lhs)?;
            let y = expect_number(op, rhs)?;
            if y == 0.0 {
                return Err(Error::runtime("division by zero"));
            }
            Ok(Value::Float(x / y))
        }
        BinOp::Mod => match (lhs, rhs) {
            (Value::Int(_), Value::Int(0)) => Err(Error::runtime("division by zero")),
            // Remainder keeps the sign of the dividend.
            (Value::Int(x), Value::Int(y)) => Ok(Value::Int(x % y)),
            _ => {
                let x = expect_number(op, lhs)?;
                let y = expect_number(op, rhs)?;
                if y == 0.0 {
                    return Err(Error::runtime("division by zero"));
                }
                Ok(Value::Float(x % y))
            }
        },
        BinOp::Pow => {
            let x = expect_number(op, lhs)?;
            let y = expect_number(op, rhs)?;
            Ok(Value::Float(x.powf(y)))
        }
        BinOp::Eq => Ok(Value::Bool(lhs == rhs)),
        BinOp::NotEq => Ok(Value::Bool(lhs != rhs)),
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => compare(op, lhs, rhs),
        BinOp::BitAnd => {
            let (x, y) = expect_int_pair(op, lhs, rhs)?;
            Ok(Value::Int(x & y))
        }
        BinOp::BitOr => {
            let (x, y) = expect_int_pair(op, lhs, rhs)?;
            Ok(Value::Int(x | y))
        }
        BinOp::BitXor => {
            let (x, y) = expect_int_pair(op, lhs, rhs)?;
            Ok(Value::Int(x ^ y))
        }
        BinOp::Shl | BinOp::Shr => {
            let (x, count) = expect_int_pair(op, lhs, rhs)?;
            if !(0..64).contains(&count) {
                return Err(Error::runtime(format!(
                    "shift amount {} out of range for '{}'",
                    count, op
                )));
            }
            let shifted = if op == BinOp::Shl {
                x.checked_shl(count as u32)
            } else {
                x.checked_shr(count as u32)
            };
            shifted
                .map(Value::Int)
                .ok_or_else(|| Error::runtime(format!("shift amount {} out of range for '{}'", count, op)))
        }
        // Operands are already evaluated when this is reached directly;
        // the short-circuit forms live in eval_binary.
        BinOp::And => Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
        BinOp::Or => Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
    }
}

fn arith(
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, Error> {
    match (lhs, rhs) {
        (Value::Int(x), Value::Int(y)) => int_op(*x, *y)
            .map(Value::Int)
            .ok_or_else(|| Error::runtime(format!("integer overflow in '{}'", op))),
        _ => {
            let x = expect_number(op, lhs)?;
            let y = expect_number(op, rhs)?;
            Ok(Value::Float(float_op(x, y)))
        }
    }
}

fn compare(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, Error> {
    let ord = lhs.partial_compare(rhs).ok_or_else(|| {
        Error::runtime(format!(
            "cannot compare {} and {} with '{}'",
            lhs.type_name(),
            rhs.type_name(),
            op
        ))
    })?;
    let result = match op {
        BinOp::Lt => ord == Ordering::Less,
        BinOp::LtEq => ord != Ordering::Greater,
        BinOp::Gt => ord == Ordering::Greater,
        _ => ord != Ordering::Less,
    };
    Ok(Value::Bool(result))
}

fn factorial(value: &Value) -> Result<Value, Error> {
    let n = match value {
        Value::Int(n) => *n,
        other => {
            return Err(Error::runtime(format!(
                "factorial requires a non-negative integer, got {}",
                other.type_name()
            )))
        }
    };
    if n < 0 {
        return Err(Error::runtime(
            "factorial requires a non-negative integer, got a negative number",
        ));
    }
    let mut acc: i64 = 1;
    for k in 2..=n {
        acc = acc
            .checked_mul(k)
            .ok_or_else(|| Error::runtime("integer overflow in factorial"))?;
    }
    Ok(Value::Int(acc))
}

fn expect_number(op: BinOp, value: &Value) -> Result<f64, Error> {
    value.as_float().ok_or_else(|| {
        Error::runtime(format!(
            "unsupported operand for '{}': {}",
            op,
            value.type_name()
        ))
    })
}

fn expect_int_pair(op: BinOp, lhs: &Value, rhs: &Value) -> Result<(i64, i64), Error> {
    match (lhs, rhs) {
        (Value::Int(x), Value::Int(y)) => Ok((*x, *y)),
        _ => Err(Error::runtime(format!(
            "bitwise '{}' requires integer operands, got {} and {}",
            op,
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}
