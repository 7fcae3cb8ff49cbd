//! Utility built-ins: conditionals, null handling and collection lookup.
//!
//! `if`/`ifnull`/`switch` here are ordinary functions with eager arguments;
//! lazy selection is what the `?:` operator is for.

use super::NativeFunction;
use abacus_core::error::Error;
use abacus_core::functions::{Arity, FunctionImpl};
use abacus_core::value::Value;
use std::sync::Arc;

pub(crate) fn functions() -> Vec<Arc<dyn FunctionImpl>> {
    vec![
        NativeFunction::entry("if", Arity::Fixed(3), if_),
        NativeFunction::entry("ifnull", Arity::Fixed(2), ifnull),
        NativeFunction::entry("coalesce", Arity::Any, coalesce),
        NativeFunction::entry("switch", Arity::Any, switch),
        NativeFunction::entry("and", Arity::Any, and),
        NativeFunction::entry("or", Arity::Any, or),
        NativeFunction::entry("lookup", Arity::Any, lookup),
    ]
}

fn if_(args: &[Value]) -> Result<Value, Error> {
    if args[0].is_truthy() {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}

fn ifnull(args: &[Value]) -> Result<Value, Error> {
    match &args[0] {
        Value::Null => Ok(args[1].clone()),
        value => Ok(value.clone()),
    }
}

fn coalesce(args: &[Value]) -> Result<Value, Error> {
    for arg in args {
        if !matches!(arg, Value::Null) {
            return Ok(arg.clone());
        }
    }
    Ok(Value::Null)
}

/// `switch(subject, c1, v1, …, default?)`: the subject is compared against
/// each case with coercing equality; a trailing odd argument is the default.
fn switch(args: &[Value]) -> Result<Value, Error> {
    if args.len() < 3 {
        return Err(Error::runtime(format!(
            "switch: expected at least 3 argument(s), got {}",
            args.len()
        )));
    }
    let subject = &args[0];
    let mut i = 1;
    while i + 1 < args.len() {
        if args[i] == *subject {
            return Ok(args[i + 1].clone());
        }
        i += 2;
    }
    if args.len() % 2 == 0 {
        Ok(args[args.len() - 1].clone())
    } else {
        Ok(Value::Null)
    }
}

fn and(args: &[Value]) -> Result<Value, Error> {
    if args.is_empty() {
        return Err(Error::runtime("and: expected at least one argument"));
    }
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn or(args: &[Value]) -> Result<Value, Error> {
    if args.is_empty() {
        return Err(Error::runtime("or: expected at least one argument"));
    }
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

/// `lookup(coll, key[, default])`: keyed lookup over maps, structs and
/// lists; a miss yields the default (or `Null`), never an error.
fn lookup(args: &[Value]) -> Result<Value, Error> {
    if args.len() != 2 && args.len() != 3 {
        return Err(Error::runtime(format!(
            "lookup: expected 2 or 3 argument(s), got {}",
            args.len()
        )));
    }
    let found = match (&args[0], &args[1]) {
        (Value::Map(entries), Value::String(key)) => entries.get(key.as_ref()).cloned(),
        (Value::Struct(fields), Value::String(key)) => fields.get_named(key).cloned(),
        (Value::List(items), Value::Int(index)) => usize::try_from(*index)
            .ok()
            .and_then(|i| items.get(i))
            .cloned(),
        (coll, key) => {
            return Err(Error::runtime(format!(
                "lookup: cannot look up {} with {}",
                coll.type_name(),
                key.type_name()
            )))
        }
    };
    match found {
        Some(value) => Ok(value),
        None => Ok(args.get(2).cloned().unwrap_or(Value::Null)),
    }
}
