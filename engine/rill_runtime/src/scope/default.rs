//! Block and parameter scopes.
//!
//! Both are plain binding tables over a parent. A `DefaultScope` is what a
//! block introduces; a `ParamScope` is the lighter layer that binds a fixed
//! set of call-time names directly over a closure's captured scope, and
//! otherwise behaves as an ordinary read/write scope.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rill_ir::Name;
use rustc_hash::FxHashMap;

use crate::errors::EvalError;
use crate::shared::SharedCell;
use crate::Value;

use super::{Mutability, Reference, Scope, ScopeHandle, SlotRef};

/// A binding slot. Redeclaration replaces the slot; references already
/// handed out keep the old cell (last write wins, no redeclaration error).
#[derive(Clone, Debug)]
struct Binding {
    cell: SharedCell<Value>,
    mutability: Mutability,
}

/// Shared core of the table-backed scopes.
#[derive(Default)]
struct BindingTable {
    bindings: RwLock<FxHashMap<Name, Binding>>,
}

impl BindingTable {
    fn get(&self, name: Name) -> Option<Reference> {
        self.bindings.read().get(&name).map(|binding| {
            Reference::Slot(SlotRef {
                cell: binding.cell.clone(),
                mutability: binding.mutability,
            })
        })
    }

    fn declare(&self, name: Name, value: Value, mutability: Mutability) {
        self.bindings.write().insert(
            name,
            Binding {
                cell: SharedCell::new(value),
                mutability,
            },
        );
    }

    fn len(&self) -> usize {
        self.bindings.read().len()
    }
}

/// The scope a block introduces.
pub struct DefaultScope {
    table: BindingTable,
    parent: Option<ScopeHandle>,
}

impl DefaultScope {
    /// A root scope with no parent.
    pub fn root() -> Arc<Self> {
        Arc::new(DefaultScope {
            table: BindingTable::default(),
            parent: None,
        })
    }

    /// A child scope over `parent`.
    pub fn child_of(parent: &ScopeHandle) -> Arc<Self> {
        Arc::new(DefaultScope {
            table: BindingTable::default(),
            parent: Some(Arc::clone(parent)),
        })
    }
}

impl Scope for DefaultScope {
    fn get_local(&self, name: Name) -> Option<Reference> {
        self.table.get(name)
    }

    fn declare(&self, name: Name, value: Value, mutability: Mutability) -> Result<(), EvalError> {
        self.table.declare(name, value, mutability);
        Ok(())
    }

    fn parent(&self) -> Option<ScopeHandle> {
        self.parent.clone()
    }
}

impl fmt::Debug for DefaultScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DefaultScope({} bindings, parent={})",
            self.table.len(),
            self.parent.is_some()
        )
    }
}

/// The scope that binds call-time parameters.
pub struct ParamScope {
    table: BindingTable,
    parent: ScopeHandle,
}

impl ParamScope {
    /// Bind `params` over the closure's captured scope.
    pub fn over(
        captured: &ScopeHandle,
        params: impl IntoIterator<Item = (Name, Value, Mutability)>,
    ) -> Arc<Self> {
        let scope = ParamScope {
            table: BindingTable::default(),
            parent: Arc::clone(captured),
        };
        for (name, value, mutability) in params {
            scope.table.declare(name, value, mutability);
        }
        Arc::new(scope)
    }
}

impl Scope for ParamScope {
    fn get_local(&self, name: Name) -> Option<Reference> {
        self.table.get(name)
    }

    fn declare(&self, name: Name, value: Value, mutability: Mutability) -> Result<(), EvalError> {
        self.table.declare(name, value, mutability);
        Ok(())
    }

    fn parent(&self) -> Option<ScopeHandle> {
        Some(Arc::clone(&self.parent))
    }
}

impl fmt::Debug for ParamScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParamScope({} bindings)", self.table.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::resolve_chain;

    fn handle(scope: Arc<DefaultScope>) -> ScopeHandle {
        scope
    }

    #[test]
    fn declare_then_resolve_gets_value() {
        let scope = handle(DefaultScope::root());
        let name = Name::from_raw(1);
        scope
            .declare(name, Value::number(42), Mutability::Mutable)
            .ok();
        let reference = resolve_chain(&scope, name).map(|r| r.get());
        assert_eq!(reference.and_then(Result::ok), Some(Value::number(42)));
    }

    #[test]
    fn set_through_reference_updates_cell() {
        let scope = handle(DefaultScope::root());
        let name = Name::from_raw(1);
        scope
            .declare(name, Value::number(1), Mutability::Mutable)
            .ok();
        let reference = match resolve_chain(&scope, name) {
            Some(r) => r,
            None => panic!("binding must resolve"),
        };
        assert!(reference.set(Value::number(2)).is_ok());
        assert_eq!(reference.get().ok(), Some(Value::number(2)));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = handle(DefaultScope::root());
        let name = Name::from_raw(1);
        parent
            .declare(name, Value::number(1), Mutability::Mutable)
            .ok();
        let child: ScopeHandle = DefaultScope::child_of(&parent);
        child
            .declare(name, Value::number(2), Mutability::Mutable)
            .ok();
        let via_child = resolve_chain(&child, name).and_then(|r| r.get().ok());
        assert_eq!(via_child, Some(Value::number(2)));
        let via_parent = resolve_chain(&parent, name).and_then(|r| r.get().ok());
        assert_eq!(via_parent, Some(Value::number(1)));
    }

    #[test]
    fn resolution_walks_to_parent() {
        let parent = handle(DefaultScope::root());
        let name = Name::from_raw(3);
        parent
            .declare(name, Value::string("outer"), Mutability::Immutable)
            .ok();
        let child: ScopeHandle = DefaultScope::child_of(&parent);
        let found = resolve_chain(&child, name).and_then(|r| r.get().ok());
        assert_eq!(found, Some(Value::string("outer")));
    }

    #[test]
    fn unresolved_name_is_none() {
        let scope = handle(DefaultScope::root());
        assert!(resolve_chain(&scope, Name::from_raw(9)).is_none());
    }

    #[test]
    fn redeclaration_overwrites() {
        let scope = handle(DefaultScope::root());
        let name = Name::from_raw(1);
        scope
            .declare(name, Value::number(1), Mutability::Immutable)
            .ok();
        scope
            .declare(name, Value::number(2), Mutability::Mutable)
            .ok();
        let reference = resolve_chain(&scope, name);
        assert_eq!(
            reference.as_ref().and_then(|r| r.get().ok()),
            Some(Value::number(2))
        );
        // The replacement slot is mutable even though the original was not
        assert!(reference.is_some_and(|r| r.is_mutable()));
    }

    #[test]
    fn param_scope_binds_over_captured() {
        let captured = handle(DefaultScope::root());
        let outer = Name::from_raw(1);
        captured
            .declare(outer, Value::number(10), Mutability::Immutable)
            .ok();
        let param = Name::from_raw(2);
        let scope: ScopeHandle =
            ParamScope::over(&captured, [(param, Value::number(5), Mutability::Mutable)]);
        assert_eq!(
            resolve_chain(&scope, param).and_then(|r| r.get().ok()),
            Some(Value::number(5))
        );
        assert_eq!(
            resolve_chain(&scope, outer).and_then(|r| r.get().ok()),
            Some(Value::number(10))
        );
    }
}
