//! Map-backed scope.
//!
//! Lookups and assignments are dictionary get/put by name. Embedders build
//! one from a map of named parameters as the initial scope of an
//! invocation; a `with` block over a scope value layers it the same way.

use std::fmt;
use std::sync::Arc;

use rill_ir::Name;
use rustc_hash::FxHashMap;

use crate::errors::EvalError;
use crate::shared::SharedCell;
use crate::Value;

use super::{MapEntryRef, Mutability, Reference, Scope, ScopeHandle};

/// A scope over a shared name→value dictionary.
///
/// Writes through resolved references go back into the same dictionary, so
/// the embedder observes script-side mutations after the call returns.
pub struct MapScope {
    entries: SharedCell<FxHashMap<Name, Value>>,
    parent: Option<ScopeHandle>,
}

impl MapScope {
    /// Build a root map scope from named entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (Name, Value)>) -> Arc<Self> {
        Arc::new(MapScope {
            entries: SharedCell::new(entries.into_iter().collect()),
            parent: None,
        })
    }

    /// Build a map scope layered over a parent.
    pub fn over(
        parent: &ScopeHandle,
        entries: impl IntoIterator<Item = (Name, Value)>,
    ) -> Arc<Self> {
        Arc::new(MapScope {
            entries: SharedCell::new(entries.into_iter().collect()),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Snapshot of the current entries.
    pub fn entries(&self) -> FxHashMap<Name, Value> {
        self.entries.get()
    }
}

impl Scope for MapScope {
    fn get_local(&self, name: Name) -> Option<Reference> {
        if self.entries.read().contains_key(&name) {
            Some(Reference::MapEntry(MapEntryRef {
                entries: self.entries.clone(),
                key: name,
            }))
        } else {
            None
        }
    }

    fn declare(&self, name: Name, value: Value, _mutability: Mutability) -> Result<(), EvalError> {
        // A dictionary has no per-entry mutability; declare is a put.
        self.entries.write().insert(name, value);
        Ok(())
    }

    fn parent(&self) -> Option<ScopeHandle> {
        self.parent.clone()
    }
}

impl fmt::Debug for MapScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MapScope({} entries)", self.entries.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::resolve_chain;

    #[test]
    fn entry_lookup_and_writeback() {
        let name = Name::from_raw(1);
        let scope: ScopeHandle = MapScope::from_entries([(name, Value::number(1))]);
        let reference = match resolve_chain(&scope, name) {
            Some(r) => r,
            None => panic!("entry must resolve"),
        };
        assert_eq!(reference.get().ok(), Some(Value::number(1)));
        assert!(reference.set(Value::number(2)).is_ok());
        assert_eq!(reference.get().ok(), Some(Value::number(2)));
    }

    #[test]
    fn missing_key_is_unresolved() {
        let scope: ScopeHandle = MapScope::from_entries([]);
        assert!(resolve_chain(&scope, Name::from_raw(5)).is_none());
    }

    #[test]
    fn declare_inserts_entry() {
        let scope: ScopeHandle = MapScope::from_entries([]);
        let name = Name::from_raw(2);
        scope
            .declare(name, Value::string("v"), Mutability::Immutable)
            .ok();
        assert_eq!(
            resolve_chain(&scope, name).and_then(|r| r.get().ok()),
            Some(Value::string("v"))
        );
    }

    #[test]
    fn embedder_observes_writeback() {
        let name = Name::from_raw(1);
        let map = MapScope::from_entries([(name, Value::number(1))]);
        let scope: ScopeHandle = map.clone();
        if let Some(r) = resolve_chain(&scope, name) {
            r.set(Value::number(9)).ok();
        }
        assert_eq!(map.entries().get(&name), Some(&Value::number(9)));
    }
}
