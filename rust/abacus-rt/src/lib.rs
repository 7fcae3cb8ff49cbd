//! Abacus Runtime
//!
//! The evaluator, the built-in function library, the compilation cache and
//! the public façade. Typical use:
//!
//! ```
//! use abacus_rt::{eval, Value};
//!
//! let scope = abacus_core::json::scope_from_json(r#"{"price": 3, "qty": 4}"#).unwrap();
//! assert_eq!(eval("price * qty", &scope).unwrap(), Value::Int(12));
//! ```
//!
//! The same expression string is typically evaluated many times against
//! different scopes: `eval` compiles through the per-registry cache, and
//! `compile` hands back a reusable [`CompiledExpr`] for callers that want to
//! amortize explicitly.

pub mod cache;
pub mod exec;
pub mod functions;

pub use abacus_core::error::{Error, ErrorKind};
pub use abacus_core::functions::{Arity, FunctionImpl, Registry, RegistryId, RegistryOptions};
pub use abacus_core::value::{StructValue, Value};
pub use exec::CompiledExpr;

use abacus_core::functions::next_registry_id;
use once_cell::sync::Lazy;
use std::sync::Arc;

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::build(
        RegistryId::DEFAULT,
        functions::defaults(),
        RegistryOptions::default(),
    )
});

/// The engine-provided registry used when callers pass none.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Build a custom registry: the default function set plus `plugins`, with
/// plugins overriding defaults by name.
pub fn new_registry(plugins: Vec<Arc<dyn FunctionImpl>>) -> Registry {
    new_registry_with(plugins, RegistryOptions::default())
}

pub fn new_registry_with(
    plugins: Vec<Arc<dyn FunctionImpl>>,
    options: RegistryOptions,
) -> Registry {
    let functions = functions::defaults().into_iter().chain(plugins);
    Registry::build(next_registry_id(), functions, options)
}

/// Compile `expr` against the default registry, through the cache.
pub fn compile(expr: &str) -> Result<CompiledExpr, Error> {
    compile_with(expr, default_registry())
}

/// Compile `expr` against `registry`, through the cache.
///
/// Successful compilations are cached per `(registry, expression)`; compile
/// errors never are, so a caller can fix the registry and retry.
pub fn compile_with(expr: &str, registry: &Registry) -> Result<CompiledExpr, Error> {
    if let Some(artifact) = cache::get(registry, expr) {
        return Ok(artifact);
    }
    let ir = abacus_compiler::parse(expr)?;
    let program = abacus_compiler::lower(&ir, registry)?;
    let artifact = CompiledExpr::new(program, registry.id());
    cache::put(registry, expr, &artifact);
    Ok(artifact)
}

/// Compile (via the cache) and apply in one step.
pub fn eval(expr: &str, scope: &Value) -> Result<Value, Error> {
    eval_with(expr, scope, default_registry())
}

pub fn eval_with(expr: &str, scope: &Value, registry: &Registry) -> Result<Value, Error> {
    compile_with(expr, registry)?.apply(scope)
}

/// Compile-and-discard: succeeds iff `compile` would.
pub fn validate(expr: &str) -> Result<(), Error> {
    validate_with(expr, default_registry())
}

pub fn validate_with(expr: &str, registry: &Registry) -> Result<(), Error> {
    compile_with(expr, registry).map(|_| ())
}

// -- Panicking variants -----------------------------------------------------
//
// Identical semantics, but failure is signalled through a panic carrying the
// rendered error instead of a returned value.

pub fn eval_or_panic(expr: &str, scope: &Value) -> Value {
    eval_with_or_panic(expr, scope, default_registry())
}

pub fn eval_with_or_panic(expr: &str, scope: &Value, registry: &Registry) -> Value {
    match eval_with(expr, scope, registry) {
        Ok(value) => value,
        Err(err) => panic!("{}", err),
    }
}

pub fn compile_or_panic(expr: &str) -> CompiledExpr {
    compile_with_or_panic(expr, default_registry())
}

pub fn compile_with_or_panic(expr: &str, registry: &Registry) -> CompiledExpr {
    match compile_with(expr, registry) {
        Ok(artifact) => artifact,
        Err(err) => panic!("{}", err),
    }
}

pub fn validate_or_panic(expr: &str) {
    validate_with_or_panic(expr, default_registry());
}

pub fn validate_with_or_panic(expr: &str, registry: &Registry) {
    if let Err(err) = validate_with(expr, registry) {
        panic!("{}", err);
    }
}
