//! Cache teardown semantics. This lives in its own test binary (hence its
//! own process): stopping the cache is global state that would interfere
//! with the other suites.

use abacus_core::json::scope_from_json;
use abacus_rt::{cache, compile_with, eval_with, new_registry, Value};

#[test]
fn test_stopped_cache_never_breaks_correctness() {
    let reg = new_registry(vec![]);
    let scope = scope_from_json("{}").expect("scope JSON should parse");

    compile_with("1 + 1", &reg).expect("compile");
    assert_eq!(cache::len(reg.id()), 1);

    // Teardown: entries are gone, puts become warn-once no-ops.
    cache::stop();
    assert_eq!(cache::len(reg.id()), 0);
    assert_eq!(
        eval_with("1 + 1", &scope, &reg).expect("eval"),
        Value::Int(2)
    );
    assert_eq!(
        eval_with("1 + 1", &scope, &reg).expect("eval"),
        Value::Int(2)
    );
    assert_eq!(cache::len(reg.id()), 0);

    // Restarting restores caching.
    cache::start();
    compile_with("1 + 1", &reg).expect("compile");
    assert_eq!(cache::len(reg.id()), 1);
}
