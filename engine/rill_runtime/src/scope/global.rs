//! The global built-ins scope.
//!
//! A single table constructed once at engine startup and immutable
//! afterwards. It is not part of any scope chain: resolution falls back to
//! it exactly once, at the root. Script code can never mutate it — module
//! registration inserts into the module registry, never here.

use std::fmt;
use std::sync::Arc;

use rill_ir::Name;
use rustc_hash::FxHashMap;

use crate::Value;

use super::Reference;

/// Immutable-after-init table of built-in bindings.
pub struct GlobalScope {
    bindings: FxHashMap<Name, Value>,
}

impl GlobalScope {
    pub fn builder() -> GlobalScopeBuilder {
        GlobalScopeBuilder {
            bindings: FxHashMap::default(),
        }
    }

    /// An empty global scope.
    pub fn empty() -> Arc<Self> {
        Arc::new(GlobalScope {
            bindings: FxHashMap::default(),
        })
    }

    /// Look up a built-in. Always a get-only reference.
    pub fn get(&self, name: Name) -> Option<Reference> {
        self.bindings
            .get(&name)
            .map(|value| Reference::Constant(value.clone()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for GlobalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GlobalScope({} bindings)", self.bindings.len())
    }
}

/// Builder collecting built-ins before the table freezes.
pub struct GlobalScopeBuilder {
    bindings: FxHashMap<Name, Value>,
}

impl GlobalScopeBuilder {
    /// Install a built-in binding. Later definitions of the same name win,
    /// so embedders can override stock built-ins before freezing.
    #[must_use]
    pub fn define(mut self, name: Name, value: Value) -> Self {
        self.bindings.insert(name, value);
        self
    }

    pub fn build(self) -> Arc<GlobalScope> {
        Arc::new(GlobalScope {
            bindings: self.bindings,
        })
    }
}
