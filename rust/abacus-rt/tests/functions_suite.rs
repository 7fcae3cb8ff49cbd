//! Built-in function library tests, one section per category.

use abacus_core::json::scope_from_json;
use abacus_rt::{eval, Value};

fn scope(json: &str) -> Value {
    scope_from_json(json).expect("scope JSON should parse")
}

fn empty() -> Value {
    scope("{}")
}

fn eval_ok(expr: &str) -> Value {
    eval_in(expr, &empty())
}

fn eval_in(expr: &str, scope: &Value) -> Value {
    match eval(expr, scope) {
        Ok(value) => value,
        Err(err) => panic!("eval({:?}) failed: {}", expr, err),
    }
}

fn assert_float(value: &Value, expected: f64) {
    match value {
        Value::Float(f) => assert!(
            (f - expected).abs() < 1e-9,
            "expected ~{}, got {}",
            expected,
            f
        ),
        other => panic!("expected Float, got {:?}", other),
    }
}

// ============================================================================
// MATH
// ============================================================================

#[test]
fn test_abs() {
    assert_eq!(eval_ok("abs(-10)"), Value::Int(10));
    assert_eq!(eval_ok("abs(10)"), Value::Int(10));
    assert_float(&eval_ok("abs(-2.5)"), 2.5);
}

#[test]
fn test_rounding_family() {
    assert_float(&eval_ok("round(2.5)"), 3.0);
    assert_float(&eval_ok("round(2.4)"), 2.0);
    assert_float(&eval_ok("floor(2.9)"), 2.0);
    assert_float(&eval_ok("ceil(2.1)"), 3.0);
    assert_float(&eval_ok("trunc(-2.9)"), -2.0);
    // Integers pass through untouched.
    assert_eq!(eval_ok("round(7)"), Value::Int(7));
    assert_eq!(eval_ok("floor(7)"), Value::Int(7));
}

#[test]
fn test_sign() {
    assert_eq!(eval_ok("sign(-9)"), Value::Int(-1));
    assert_eq!(eval_ok("sign(0)"), Value::Int(0));
    assert_eq!(eval_ok("sign(0.0)"), Value::Int(0));
    assert_eq!(eval_ok("sign(2.5)"), Value::Int(1));
}

#[test]
fn test_max_min_variadic_and_list_forms() {
    assert_eq!(eval_ok("max(1, 9, 4)"), Value::Int(9));
    assert_eq!(eval_ok("min(1, 9, 4)"), Value::Int(1));
    let s = scope(r#"{"xs": [3, 8, 5]}"#);
    assert_eq!(eval_in("max(xs)", &s), Value::Int(8));
    assert_eq!(eval_in("min(xs)", &s), Value::Int(3));
    // Mixed int/float keeps the winning operand's kind.
    assert_float(&eval_ok("max(1, 2.5)"), 2.5);
}

#[test]
fn test_max_requires_numbers() {
    assert!(eval("max('a', 1)", &empty()).is_err());
    assert!(eval("max()", &empty()).is_err());
}

#[test]
fn test_exponentials_and_logs() {
    assert_float(&eval_ok("sqrt(16)"), 4.0);
    assert_float(&eval_ok("exp(0)"), 1.0);
    assert_float(&eval_ok("ln(exp(1))"), 1.0);
    assert_float(&eval_ok("log(8, 2)"), 3.0);
    assert_float(&eval_ok("log10(1000)"), 3.0);
}

#[test]
fn test_math_domain_errors() {
    assert!(eval("sqrt(-1)", &empty()).is_err());
    assert!(eval("ln(0)", &empty()).is_err());
    assert!(eval("log10(-5)", &empty()).is_err());
    assert!(eval("log(8, 1)", &empty()).is_err());
}

#[test]
fn test_sum_and_avg() {
    assert_eq!(eval_ok("sum(1, 2, 3)"), Value::Int(6));
    let s = scope(r#"{"xs": [1, 2, 3, 4]}"#);
    assert_eq!(eval_in("sum(xs)", &s), Value::Int(10));
    assert_float(&eval_in("avg(xs)", &s), 2.5);
    assert_float(&eval_ok("sum(1, 2.5)"), 3.5);
    assert_eq!(eval_in("sum(empty)", &scope(r#"{"empty": []}"#)), Value::Int(0));
    assert!(eval("avg()", &empty()).is_err());
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_len() {
    assert_eq!(eval_ok("len('hello')"), Value::Int(5));
    let s = scope(r#"{"xs": [1, 2, 3], "m": {"a": 1}}"#);
    assert_eq!(eval_in("len(xs)", &s), Value::Int(3));
    assert_eq!(eval_in("len(m)", &s), Value::Int(1));
    // Characters, not bytes.
    assert_eq!(eval_ok("len('héllo')"), Value::Int(5));
    assert!(eval("len(1)", &empty()).is_err());
}

#[test]
fn test_left_right() {
    assert_eq!(eval_ok("left('abcdef', 2)"), Value::from("ab"));
    assert_eq!(eval_ok("right('abcdef', 2)"), Value::from("ef"));
    // Counts clamp to the string.
    assert_eq!(eval_ok("left('ab', 10)"), Value::from("ab"));
    assert_eq!(eval_ok("right('ab', 10)"), Value::from("ab"));
}

#[test]
fn test_substring() {
    assert_eq!(eval_ok("substring('abcdef', 2)"), Value::from("cdef"));
    assert_eq!(eval_ok("substring('abcdef', 2, 3)"), Value::from("cde"));
    assert_eq!(eval_ok("substring('abc', 1, 99)"), Value::from("bc"));
    assert!(eval("substring('abc', -1)", &empty()).is_err());
    assert!(eval("substring('abc')", &empty()).is_err());
}

#[test]
fn test_case_and_trim() {
    assert_eq!(eval_ok("upper('abc')"), Value::from("ABC"));
    assert_eq!(eval_ok("lower('ABC')"), Value::from("abc"));
    assert_eq!(eval_ok("trim('  x  ')"), Value::from("x"));
}

#[test]
fn test_concat() {
    assert_eq!(eval_ok("concat('a', 1, true)"), Value::from("a1true"));
    assert_eq!(eval_ok("concat()"), Value::from(""));
    // Null contributes nothing to produced text.
    assert_eq!(eval_ok("concat('a', null, 'b')"), Value::from("ab"));
}

#[test]
fn test_concat_of_a_single_string_is_identity() {
    let s = scope(r#"{"x": "already text"}"#);
    assert_eq!(eval_in("concat(x)", &s), Value::from("already text"));
}

#[test]
fn test_textjoin() {
    assert_eq!(
        eval_ok("textjoin('-', 'a', 'b', 'c')"),
        Value::from("a-b-c")
    );
    let s = scope(r#"{"xs": [1, 2, 3]}"#);
    assert_eq!(eval_in("textjoin(', ', xs)", &s), Value::from("1, 2, 3"));
    assert!(eval("textjoin()", &empty()).is_err());
}

#[test]
fn test_replace() {
    assert_eq!(
        eval_ok("replace('a-b-c', '-', '+')"),
        Value::from("a+b+c")
    );
}

#[test]
fn test_find_is_zero_based_or_minus_one() {
    assert_eq!(eval_ok("find('lo', 'hello')"), Value::Int(3));
    assert_eq!(eval_ok("find('zz', 'hello')"), Value::Int(-1));
    assert_eq!(eval_ok("find('h', 'héllo')"), Value::Int(0));
    assert_eq!(eval_ok("find('llo', 'héllo')"), Value::Int(2));
}

#[test]
fn test_contains() {
    assert_eq!(eval_ok("contains('hello', 'ell')"), Value::Bool(true));
    assert_eq!(eval_ok("contains('hello', 'zz')"), Value::Bool(false));
}

#[test]
fn test_normalize() {
    assert_eq!(
        eval_ok("normalize('Net Total Due')"),
        Value::from("net_total_due")
    );
}

// ============================================================================
// UTILITY
// ============================================================================

#[test]
fn test_if_uses_truthiness() {
    assert_eq!(eval_ok("if(1 > 2, 'a', 'b')"), Value::from("b"));
    assert_eq!(eval_ok("if(0, 'a', 'b')"), Value::from("a"));
    assert_eq!(eval_ok("if(null, 'a', 'b')"), Value::from("b"));
}

#[test]
fn test_ifnull_and_coalesce() {
    assert_eq!(eval_ok("ifnull(null, 5)"), Value::Int(5));
    assert_eq!(eval_ok("ifnull(0, 5)"), Value::Int(0));
    assert_eq!(eval_ok("coalesce(null, null, 3, 4)"), Value::Int(3));
    assert_eq!(eval_ok("coalesce(null, null)"), Value::Null);
}

#[test]
fn test_switch() {
    let s = scope(r#"{"code": "b"}"#);
    assert_eq!(
        eval_in("switch(code, 'a', 1, 'b', 2, 'c', 3)", &s),
        Value::Int(2)
    );
    assert_eq!(
        eval_in("switch(code, 'x', 1, 99)", &s),
        Value::Int(99)
    );
    assert_eq!(eval_in("switch(code, 'x', 1)", &s), Value::Null);
    assert!(eval("switch(1)", &empty()).is_err());
}

#[test]
fn test_and_or_functions() {
    assert_eq!(eval_ok("and(1, 'x', true)"), Value::Bool(true));
    assert_eq!(eval_ok("and(1, null)"), Value::Bool(false));
    assert_eq!(eval_ok("or(null, false, 3)"), Value::Bool(true));
    assert_eq!(eval_ok("or(null, false)"), Value::Bool(false));
    assert!(eval("and()", &empty()).is_err());
}

#[test]
fn test_lookup() {
    let s = scope(r#"{"m": {"a": 1}, "xs": [10, 20]}"#);
    assert_eq!(eval_in("lookup(m, 'a')", &s), Value::Int(1));
    assert_eq!(eval_in("lookup(m, 'z')", &s), Value::Null);
    assert_eq!(eval_in("lookup(m, 'z', -1)", &s), Value::Int(-1));
    assert_eq!(eval_in("lookup(xs, 1)", &s), Value::Int(20));
    assert_eq!(eval_in("lookup(xs, 9, 'none')", &s), Value::from("none"));
    assert!(eval("lookup(1, 'a')", &empty()).is_err());
}
