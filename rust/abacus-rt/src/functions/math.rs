//! Numeric built-ins.

use super::{expect_number, numeric_operands, NativeFunction};
use abacus_core::error::Error;
use abacus_core::functions::{Arity, FunctionImpl};
use abacus_core::value::Value;
use std::sync::Arc;

pub(crate) fn functions() -> Vec<Arc<dyn FunctionImpl>> {
    vec![
        NativeFunction::entry("abs", Arity::Fixed(1), abs),
        NativeFunction::entry("round", Arity::Fixed(1), round),
        NativeFunction::entry("floor", Arity::Fixed(1), floor),
        NativeFunction::entry("ceil", Arity::Fixed(1), ceil),
        NativeFunction::entry("trunc", Arity::Fixed(1), trunc),
        NativeFunction::entry("sign", Arity::Fixed(1), sign),
        NativeFunction::entry("max", Arity::Any, max),
        NativeFunction::entry("min", Arity::Any, min),
        NativeFunction::entry("sqrt", Arity::Fixed(1), sqrt),
        NativeFunction::entry("exp", Arity::Fixed(1), exp),
        NativeFunction::entry("ln", Arity::Fixed(1), ln),
        NativeFunction::entry("log", Arity::Fixed(2), log),
        NativeFunction::entry("log10", Arity::Fixed(1), log10),
        NativeFunction::entry("sum", Arity::Any, sum),
        NativeFunction::entry("avg", Arity::Any, avg),
    ]
}

fn abs(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| Error::runtime("abs: integer overflow")),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Err(Error::runtime(format!(
            "abs: expected a number, got {}",
            other.type_name()
        ))),
    }
}

// round/floor/ceil/trunc keep the numeric kind of their input: integers
// pass through, floats stay floats.
fn round(args: &[Value]) -> Result<Value, Error> {
    rounding("round", &args[0], f64::round)
}

fn floor(args: &[Value]) -> Result<Value, Error> {
    rounding("floor", &args[0], f64::floor)
}

fn ceil(args: &[Value]) -> Result<Value, Error> {
    rounding("ceil", &args[0], f64::ceil)
}

fn trunc(args: &[Value]) -> Result<Value, Error> {
    rounding("trunc", &args[0], f64::trunc)
}

fn rounding(func: &str, arg: &Value, op: fn(f64) -> f64) -> Result<Value, Error> {
    match arg {
        Value::Int(n) => Ok(Value::Int(*n)),
        Value::Float(f) => Ok(Value::Float(op(*f))),
        other => Err(Error::runtime(format!(
            "{}: expected a number, got {}",
            func,
            other.type_name()
        ))),
    }
}

fn sign(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Int(n) => Ok(Value::Int(n.signum())),
        Value::Float(f) => {
            let s = if *f > 0.0 {
                1
            } else if *f < 0.0 {
                -1
            } else {
                0
            };
            Ok(Value::Int(s))
        }
        other => Err(Error::runtime(format!(
            "sign: expected a number, got {}",
            other.type_name()
        ))),
    }
}

fn max(args: &[Value]) -> Result<Value, Error> {
    extreme("max", args, std::cmp::Ordering::Greater)
}

fn min(args: &[Value]) -> Result<Value, Error> {
    extreme("min", args, std::cmp::Ordering::Less)
}

fn extreme(func: &str, args: &[Value], keep: std::cmp::Ordering) -> Result<Value, Error> {
    let operands = numeric_operands(args);
    let mut best: Option<&Value> = None;
    for value in operands {
        expect_number(func, value)?;
        best = match best {
            None => Some(value),
            Some(current) => {
                // Both sides are numbers, so the comparison is defined.
                if value.partial_compare(current) == Some(keep) {
                    Some(value)
                } else {
                    Some(current)
                }
            }
        };
    }
    best.cloned()
        .ok_or_else(|| Error::runtime(format!("{}: expected at least one value", func)))
}

fn sqrt(args: &[Value]) -> Result<Value, Error> {
    let x = expect_number("sqrt", &args[0])?;
    if x < 0.0 {
        return Err(Error::runtime("sqrt: negative argument"));
    }
    Ok(Value::Float(x.sqrt()))
}

fn exp(args: &[Value]) -> Result<Value, Error> {
    let x = expect_number("exp", &args[0])?;
    Ok(Value::Float(x.exp()))
}

fn ln(args: &[Value]) -> Result<Value, Error> {
    let x = expect_number("ln", &args[0])?;
    if x <= 0.0 {
        return Err(Error::runtime("ln: argument must be positive"));
    }
    Ok(Value::Float(x.ln()))
}

fn log(args: &[Value]) -> Result<Value, Error> {
    let x = expect_number("log", &args[0])?;
    let base = expect_number("log", &args[1])?;
    if x <= 0.0 {
        return Err(Error::runtime("log: argument must be positive"));
    }
    if base <= 0.0 || base == 1.0 {
        return Err(Error::runtime("log: invalid base"));
    }
    Ok(Value::Float(x.log(base)))
}

fn log10(args: &[Value]) -> Result<Value, Error> {
    let x = expect_number("log10", &args[0])?;
    if x <= 0.0 {
        return Err(Error::runtime("log10: argument must be positive"));
    }
    Ok(Value::Float(x.log10()))
}

/// Sums stay integral until a float operand appears.
fn sum(args: &[Value]) -> Result<Value, Error> {
    fold_numeric("sum", numeric_operands(args))
}

fn avg(args: &[Value]) -> Result<Value, Error> {
    let operands = numeric_operands(args);
    if operands.is_empty() {
        return Err(Error::runtime("avg: expected at least one value"));
    }
    let mut total = 0.0;
    for value in operands {
        total += expect_number("avg", value)?;
    }
    Ok(Value::Float(total / operands.len() as f64))
}

fn fold_numeric(func: &str, operands: &[Value]) -> Result<Value, Error> {
    let mut int_acc: i64 = 0;
    let mut float_acc = 0.0;
    let mut is_float = false;
    for value in operands {
        match value {
            Value::Int(n) if !is_float => {
                int_acc = int_acc
                    .checked_add(*n)
                    .ok_or_else(|| Error::runtime(format!("{}: integer overflow", func)))?;
            }
            Value::Int(n) => float_acc += *n as f64,
            Value::Float(f) => {
                if !is_float {
                    is_float = true;
                    float_acc = int_acc as f64;
                }
                float_acc += f;
            }
            other => {
                return Err(Error::runtime(format!(
                    "{}: expected a number, got {}",
                    func,
                    other.type_name()
                )))
            }
        }
    }
    Ok(if is_float {
        Value::Float(float_acc)
    } else {
        Value::Int(int_acc)
    })
}
