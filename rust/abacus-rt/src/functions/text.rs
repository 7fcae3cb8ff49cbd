//! String built-ins. Positions and lengths count characters, not bytes.

use super::{expect_int, expect_str, NativeFunction};
use abacus_core::error::Error;
use abacus_core::functions::{Arity, FunctionImpl};
use abacus_core::value::Value;
use std::sync::Arc;

pub(crate) fn functions() -> Vec<Arc<dyn FunctionImpl>> {
    vec![
        NativeFunction::entry("len", Arity::Fixed(1), len),
        NativeFunction::entry("left", Arity::Fixed(2), left),
        NativeFunction::entry("right", Arity::Fixed(2), right),
        NativeFunction::entry("substring", Arity::Any, substring),
        NativeFunction::entry("upper", Arity::Fixed(1), upper),
        NativeFunction::entry("lower", Arity::Fixed(1), lower),
        NativeFunction::entry("trim", Arity::Fixed(1), trim),
        NativeFunction::entry("concat", Arity::Any, concat),
        NativeFunction::entry("textjoin", Arity::Any, textjoin),
        NativeFunction::entry("replace", Arity::Fixed(3), replace),
        NativeFunction::entry("find", Arity::Fixed(2), find),
        NativeFunction::entry("contains", Arity::Fixed(2), contains),
        NativeFunction::entry("normalize", Arity::Fixed(1), normalize),
    ]
}

fn len(args: &[Value]) -> Result<Value, Error> {
    let n = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(entries) => entries.len(),
        Value::Struct(fields) => fields.len(),
        other => {
            return Err(Error::runtime(format!(
                "len: expected a string or collection, got {}",
                other.type_name()
            )))
        }
    };
    Ok(Value::Int(n as i64))
}

fn left(args: &[Value]) -> Result<Value, Error> {
    let s = expect_str("left", &args[0])?;
    let n = expect_int("left", &args[1])?.max(0) as usize;
    Ok(Value::from(s.chars().take(n).collect::<String>()))
}

fn right(args: &[Value]) -> Result<Value, Error> {
    let s = expect_str("right", &args[0])?;
    let n = expect_int("right", &args[1])?.max(0) as usize;
    let total = s.chars().count();
    Ok(Value::from(
        s.chars().skip(total.saturating_sub(n)).collect::<String>(),
    ))
}

/// `substring(s, start[, len])`: 0-based start; both start and the
/// optional length clamp to the end of the string.
fn substring(args: &[Value]) -> Result<Value, Error> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::runtime(format!(
            "substring: expected 2 or 3 argument(s), got {}",
            args.len()
        )));
    }
    let s = expect_str("substring", &args[0])?;
    let start = expect_int("substring", &args[1])?;
    if start < 0 {
        return Err(Error::runtime("substring: start must be non-negative"));
    }
    let rest = s.chars().skip(start as usize);
    let out: String = match args.get(2) {
        Some(arg) => {
            let n = expect_int("substring", arg)?;
            if n < 0 {
                return Err(Error::runtime("substring: length must be non-negative"));
            }
            rest.take(n as usize).collect()
        }
        None => rest.collect(),
    };
    Ok(Value::from(out))
}

fn upper(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(expect_str("upper", &args[0])?.to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(expect_str("lower", &args[0])?.to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, Error> {
    Ok(Value::from(expect_str("trim", &args[0])?.trim()))
}

fn concat(args: &[Value]) -> Result<Value, Error> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_text());
    }
    Ok(Value::from(out))
}

/// `textjoin(sep, …)`: list arguments contribute their elements.
fn textjoin(args: &[Value]) -> Result<Value, Error> {
    let [sep, rest @ ..] = args else {
        return Err(Error::runtime("textjoin: expected at least a separator"));
    };
    let sep = expect_str("textjoin", sep)?;
    let mut parts = Vec::new();
    for arg in rest {
        match arg {
            Value::List(items) => parts.extend(items.iter().map(Value::to_text)),
            other => parts.push(other.to_text()),
        }
    }
    Ok(Value::from(parts.join(sep)))
}

fn replace(args: &[Value]) -> Result<Value, Error> {
    let s = expect_str("replace", &args[0])?;
    let old = expect_str("replace", &args[1])?;
    let new = expect_str("replace", &args[2])?;
    Ok(Value::from(s.replace(old, new)))
}

/// `find(needle, hay)`: 0-based character position of the first match,
/// or -1.
fn find(args: &[Value]) -> Result<Value, Error> {
    let needle = expect_str("find", &args[0])?;
    let hay = expect_str("find", &args[1])?;
    match hay.find(needle) {
        Some(byte_index) => Ok(Value::Int(hay[..byte_index].chars().count() as i64)),
        None => Ok(Value::Int(-1)),
    }
}

fn contains(args: &[Value]) -> Result<Value, Error> {
    let s = expect_str("contains", &args[0])?;
    let sub = expect_str("contains", &args[1])?;
    Ok(Value::Bool(s.contains(sub)))
}

/// Downcase and replace spaces with underscores.
fn normalize(args: &[Value]) -> Result<Value, Error> {
    let s = expect_str("normalize", &args[0])?;
    Ok(Value::from(s.to_lowercase().replace(' ', "_")))
}
