//! Per-registry LRU cache of compiled expressions.
//!
//! One global table keyed by registry id, then by expression text. Readers
//! share the read lock and touch `last_access` with an atomic store, so
//! concurrent hits never block one another; inserts and evictions take the
//! write lock briefly. Recency stamps come from one monotonic counter, and
//! eviction decisions tolerate the bounded staleness of in-flight touches.

use crate::exec::CompiledExpr;
use abacus_core::functions::{Registry, RegistryId};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

struct CacheEntry {
    artifact: CompiledExpr,
    last_access: AtomicU64,
}

type PerRegistry = HashMap<String, CacheEntry>;

static TABLE: Lazy<RwLock<HashMap<u64, PerRegistry>>> = Lazy::new(|| RwLock::new(HashMap::new()));
static COUNTER: AtomicU64 = AtomicU64::new(1);
static STOPPED: AtomicBool = AtomicBool::new(false);
static STOP_WARNED: AtomicBool = AtomicBool::new(false);

fn next_stamp() -> u64 {
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Look up a cached artifact, refreshing its recency on a hit.
pub(crate) fn get(registry: &Registry, expr: &str) -> Option<CompiledExpr> {
    if !registry.cache_enabled() || STOPPED.load(Ordering::Relaxed) {
        return None;
    }
    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    let entry = table.get(&registry.id().0)?.get(expr)?;
    entry.last_access.store(next_stamp(), Ordering::Relaxed);
    Some(entry.artifact.clone())
}

/// Insert an artifact, then evict least-recently-touched entries until the
/// registry is back under its limit.
pub(crate) fn put(registry: &Registry, expr: &str, artifact: &CompiledExpr) {
    if !registry.cache_enabled() {
        return;
    }
    if STOPPED.load(Ordering::Relaxed) {
        // One warning per process; a missing cache only forfeits caching.
        if !STOP_WARNED.swap(true, Ordering::Relaxed) {
            eprintln!("abacus: compilation cache is stopped; expressions will be recompiled");
        }
        return;
    }
    let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    let entries = table.entry(registry.id().0).or_default();
    entries.insert(
        expr.to_string(),
        CacheEntry {
            artifact: artifact.clone(),
            last_access: AtomicU64::new(next_stamp()),
        },
    );
    let limit = registry.cache_limit().max(1);
    while entries.len() > limit {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access.load(Ordering::Relaxed))
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                entries.remove(&key);
            }
            None => break,
        }
    }
}

/// Number of cached entries for a registry.
pub fn len(id: RegistryId) -> usize {
    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    table.get(&id.0).map(PerRegistry::len).unwrap_or(0)
}

/// Drop every cached entry.
pub fn clear() {
    let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    table.clear();
}

/// Drop the cached entries of one registry.
pub fn clear_registry(id: RegistryId) {
    let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    table.remove(&id.0);
}

/// Tear the cache down: entries are dropped, `get` misses and `put` becomes
/// a warn-once no-op until [`start`] is called. Correctness is unaffected.
pub fn stop() {
    STOPPED.store(true, Ordering::Relaxed);
    clear();
}

/// Bring a stopped cache back.
pub fn start() {
    STOPPED.store(false, Ordering::Relaxed);
}
