//! Built-in function library.
//!
//! Functions are grouped by category to keep the modules small: `math`,
//! `text` and `util`. `defaults()` assembles the default registry contents;
//! plugins override any of these by registering the same name.

pub mod math;
pub mod text;
pub mod util;

use abacus_core::error::Error;
use abacus_core::functions::{Arity, FunctionImpl};
use abacus_core::value::Value;
use std::sync::Arc;

/// Adapter turning a plain function pointer into a registrable built-in.
pub struct NativeFunction {
    name: &'static str,
    arity: Arity,
    run: fn(&[Value]) -> Result<Value, Error>,
}

impl NativeFunction {
    pub fn entry(
        name: &'static str,
        arity: Arity,
        run: fn(&[Value]) -> Result<Value, Error>,
    ) -> Arc<dyn FunctionImpl> {
        Arc::new(Self { name, arity, run })
    }
}

impl FunctionImpl for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn arity(&self) -> Arity {
        self.arity
    }

    fn invoke(&self, args: &[Value]) -> Result<Value, Error> {
        // The compiler validates fixed arities; this guards direct callers.
        if !self.arity.accepts(args.len()) {
            return Err(Error::runtime(format!(
                "{}: expected {} argument(s), got {}",
                self.name,
                match self.arity {
                    Arity::Fixed(n) => n,
                    Arity::Any => args.len(),
                },
                args.len()
            )));
        }
        (self.run)(args)
    }
}

/// The default function set.
pub fn defaults() -> Vec<Arc<dyn FunctionImpl>> {
    let mut all = Vec::new();
    all.extend(math::functions());
    all.extend(text::functions());
    all.extend(util::functions());
    all
}

// -- Shared argument helpers ------------------------------------------------

pub(crate) fn expect_number(func: &str, arg: &Value) -> Result<f64, Error> {
    arg.as_float().ok_or_else(|| {
        Error::runtime(format!(
            "{}: expected a number, got {}",
            func,
            arg.type_name()
        ))
    })
}

pub(crate) fn expect_int(func: &str, arg: &Value) -> Result<i64, Error> {
    arg.as_int().ok_or_else(|| {
        Error::runtime(format!(
            "{}: expected an integer, got {}",
            func,
            arg.type_name()
        ))
    })
}

pub(crate) fn expect_str<'a>(func: &str, arg: &'a Value) -> Result<&'a str, Error> {
    arg.as_str().ok_or_else(|| {
        Error::runtime(format!(
            "{}: expected a string, got {}",
            func,
            arg.type_name()
        ))
    })
}

/// Variadic numeric built-ins accept either a single list argument or the
/// numbers spelled out inline (spreadsheet style).
pub(crate) fn numeric_operands<'a>(args: &'a [Value]) -> &'a [Value] {
    match args {
        [Value::List(items)] => items.as_slice(),
        _ => args,
    }
}
