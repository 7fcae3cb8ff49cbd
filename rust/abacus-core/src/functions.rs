//! Function contract and registry.
//!
//! A registry is a frozen name → implementation table assembled once at
//! construction. Resolution happens at compile time; scope values are never
//! callable.

use crate::error::Error;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Argument-count contract of a function, validated at compile time when
/// fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Any,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => n == count,
            Arity::Any => true,
        }
    }
}

/// A callable registered under a name.
///
/// Implementations must be thread-safe: a compiled expression embeds the
/// resolved handle and may be applied concurrently.
pub trait FunctionImpl: Send + Sync {
    /// Identifier used in expressions.
    fn name(&self) -> &str;

    fn arity(&self) -> Arity;

    /// Invoke with already-evaluated arguments. Failures are reported
    /// through the engine error type and propagate to the caller unchanged.
    fn invoke(&self, args: &[Value]) -> Result<Value, Error>;
}

/// Stable identity of a registry, used as the cache partition key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistryId(pub u64);

impl RegistryId {
    /// The engine-provided default registry.
    pub const DEFAULT: RegistryId = RegistryId(0);
}

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Draw a fresh id for a custom registry.
pub fn next_registry_id() -> RegistryId {
    RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
}

/// Per-registry cache configuration.
#[derive(Debug, Clone, Copy)]
pub struct RegistryOptions {
    pub cache_enabled: bool,
    pub cache_limit: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_limit: 1000,
        }
    }
}

/// A frozen function table. Within a registry, names are unique; when the
/// same name is supplied twice at construction, the last writer wins (this
/// is how plugins override defaults).
pub struct Registry {
    id: RegistryId,
    functions: HashMap<String, Arc<dyn FunctionImpl>>,
    options: RegistryOptions,
}

impl Registry {
    pub fn build(
        id: RegistryId,
        functions: impl IntoIterator<Item = Arc<dyn FunctionImpl>>,
        options: RegistryOptions,
    ) -> Self {
        let mut table = HashMap::new();
        for func in functions {
            table.insert(func.name().to_string(), func);
        }
        Self {
            id,
            functions: table,
            options,
        }
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn resolve(&self, name: &str) -> Option<&Arc<dyn FunctionImpl>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn cache_enabled(&self) -> bool {
        self.options.cache_enabled
    }

    pub fn cache_limit(&self) -> usize {
        self.options.cache_limit
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("functions", &self.functions.len())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub(&'static str);

    impl FunctionImpl for Stub {
        fn name(&self) -> &str {
            self.0
        }
        fn arity(&self) -> Arity {
            Arity::Fixed(0)
        }
        fn invoke(&self, _args: &[Value]) -> Result<Value, Error> {
            Ok(Value::from(self.0))
        }
    }

    #[test]
    fn test_arity_accepts() {
        assert!(Arity::Fixed(2).accepts(2));
        assert!(!Arity::Fixed(2).accepts(3));
        assert!(Arity::Any.accepts(0));
        assert!(Arity::Any.accepts(17));
    }

    #[test]
    fn test_last_writer_wins() {
        let first: Arc<dyn FunctionImpl> = Arc::new(Stub("dup"));
        let second: Arc<dyn FunctionImpl> = Arc::new(Stub("dup"));
        let reg = Registry::build(
            next_registry_id(),
            vec![first, second.clone()],
            RegistryOptions::default(),
        );
        assert_eq!(reg.len(), 1);
        let resolved = reg.resolve("dup").map(Arc::as_ptr);
        assert_eq!(resolved, Some(Arc::as_ptr(&second)));
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = next_registry_id();
        let b = next_registry_id();
        assert_ne!(a, b);
        assert_ne!(a, RegistryId::DEFAULT);
    }
}
