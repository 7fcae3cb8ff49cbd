//! Lowering tests: function resolution, arity validation and error
//! classification, against the runtime's default registry.

use abacus_compiler::{lower, parse, CompileError};
use abacus_core::error::ErrorKind;
use abacus_rt::default_registry;

fn lower_src(src: &str) -> Result<abacus_compiler::compiler::lir::Program, CompileError> {
    let ir = parse(src).expect("parse should succeed");
    lower(&ir, default_registry())
}

#[test]
fn test_plain_expressions_lower() {
    assert!(lower_src("1 + 2 * 3").is_ok());
    assert!(lower_src("a ? b.c[0] : -d").is_ok());
    assert!(lower_src("orders[*].(qty * price)").is_ok());
}

#[test]
fn test_known_function_resolves() {
    assert!(lower_src("abs(-1)").is_ok());
    assert!(lower_src("max(1, 2, 3)").is_ok());
}

#[test]
fn test_unknown_function_is_a_compile_error() {
    let err = lower_src("frobnicate(1)").unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownFunction("frobnicate".to_string())
    );
    assert_eq!(err.to_string(), "unknown function: frobnicate");
}

#[test]
fn test_fixed_arity_is_validated() {
    let err = lower_src("abs(1, 2)").unwrap_err();
    assert_eq!(
        err,
        CompileError::ArityMismatch {
            name: "abs".to_string(),
            expected: 1,
            actual: 2,
        }
    );
    let message = err.to_string();
    assert!(message.contains("abs"));
    assert!(message.contains('1'));
    assert!(message.contains('2'));
}

#[test]
fn test_variadic_functions_accept_any_count() {
    assert!(lower_src("max(1)").is_ok());
    assert!(lower_src("concat()").is_ok());
    assert!(lower_src("coalesce(a, b, c, d, e)").is_ok());
}

#[test]
fn test_arity_errors_surface_from_nested_arguments() {
    let err = lower_src("1 + abs()").unwrap_err();
    assert!(matches!(err, CompileError::ArityMismatch { .. }));
}

#[test]
fn test_unknown_function_inside_spread_body() {
    let err = lower_src("orders[*].(mystery(qty))").unwrap_err();
    assert_eq!(err, CompileError::UnknownFunction("mystery".to_string()));
}

#[test]
fn test_compile_error_converts_to_compiler_kind() {
    let err: abacus_core::error::Error = lower_src("nope()").unwrap_err().into();
    assert_eq!(err.kind, ErrorKind::Compiler);
    assert!(err.line.is_none());
    assert_eq!(
        err.to_string(),
        "Compilation error: unknown function: nope"
    );
}
