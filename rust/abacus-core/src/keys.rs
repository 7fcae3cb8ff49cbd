//! Process-wide interning table for struct field keys.
//!
//! Hosts mint keys with [`intern`] when they build struct values. Expression
//! evaluation only ever uses the non-inserting [`lookup`], so no expression
//! can grow this table; the pool is bounded by what the host interned.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// A pre-interned symbolic key identifying a struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyId(u32);

#[derive(Default)]
struct KeyTable {
    names: Vec<Arc<str>>,
    ids: HashMap<Arc<str>, u32>,
}

static TABLE: Lazy<RwLock<KeyTable>> = Lazy::new(|| RwLock::new(KeyTable::default()));

/// Intern `name`, minting a new key if it was never seen. Host-side only.
pub fn intern(name: &str) -> KeyId {
    if let Some(id) = lookup(name) {
        return id;
    }
    let mut table = TABLE.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(&id) = table.ids.get(name) {
        return KeyId(id);
    }
    let id = table.names.len() as u32;
    let name: Arc<str> = Arc::from(name);
    table.names.push(name.clone());
    table.ids.insert(name, id);
    KeyId(id)
}

/// Resolve `name` to an existing key without ever inserting.
pub fn lookup(name: &str) -> Option<KeyId> {
    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    table.ids.get(name).copied().map(KeyId)
}

/// The interned name for `id`, if it exists.
pub fn resolve(id: KeyId) -> Option<Arc<str>> {
    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    table.names.get(id.0 as usize).cloned()
}

/// Number of interned keys. Exposed so tests can assert that evaluation
/// never grows the pool.
pub fn table_len() -> usize {
    let table = TABLE.read().unwrap_or_else(PoisonError::into_inner);
    table.names.len()
}
