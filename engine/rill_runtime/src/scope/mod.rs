//! Lexical scope chain.
//!
//! A scope resolves names to [`Reference`]s and accepts declarations into
//! its innermost layer. Scopes are shared-ownership nodes: a child holds an
//! `Arc` of its parent, fixed at construction, and parents never point at
//! children, so the chain structure itself cannot form cycles.
//!
//! Resolution walks the local scope, then the wrapped/combined scope (if
//! any), then the parent chain. The fallback to the global built-ins table
//! happens once, at the root of resolution, in the evaluator — not on every
//! hop.

mod combined;
mod default;
mod global;
mod map;
mod object;

use std::fmt;
use std::sync::Arc;

use rill_ir::Name;

use crate::errors::EvalError;
use crate::host::{HostHandle, HostObject};
use crate::shared::SharedCell;
use crate::Value;

pub use combined::CombinedScope;
pub use default::{DefaultScope, ParamScope};
pub use global::{GlobalScope, GlobalScopeBuilder};
pub use map::MapScope;
pub use object::ObjectScope;

use rustc_hash::FxHashMap;

/// Whether a binding can be reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// Binding can be reassigned (`var x = ...`).
    Mutable,
    /// Binding cannot be reassigned (`val x = ...`).
    Immutable,
}

impl Mutability {
    /// Returns `true` if this is `Mutable`.
    #[inline]
    pub fn is_mutable(self) -> bool {
        matches!(self, Mutability::Mutable)
    }
}

/// Error returned by [`Reference::set`] when assignment fails.
///
/// Typed so the evaluator can produce the correct diagnostic with the
/// identifier it resolved (references carry only interned names).
#[derive(Debug)]
pub enum AssignError {
    /// The reference is read-only.
    ReadOnly,
    /// A host member write failed.
    Host(EvalError),
}

/// Shared handle to a scope in the chain.
pub type ScopeHandle = Arc<dyn Scope>;

/// A name-resolution environment.
pub trait Scope: Send + Sync + fmt::Debug {
    /// Look up a name in this scope only (no parent walk). A combined
    /// scope searches its whole primary chain here.
    fn get_local(&self, name: Name) -> Option<Reference>;

    /// Declare a binding in this scope, shadowing any outer binding of the
    /// same name. Re-declaring in the same scope overwrites (last write
    /// wins). Object-backed scopes reject this: a foreign object's member
    /// set is fixed externally.
    fn declare(&self, name: Name, value: Value, mutability: Mutability) -> Result<(), EvalError>;

    /// Parent scope, fixed at construction.
    fn parent(&self) -> Option<ScopeHandle>;
}

/// Walk a scope chain looking for a name.
///
/// Returns `None` when nothing in the chain binds the name; the caller
/// decides whether to fall back to globals or raise `Undefined`.
pub fn resolve_chain(scope: &ScopeHandle, name: Name) -> Option<Reference> {
    let mut current = Some(Arc::clone(scope));
    while let Some(s) = current {
        if let Some(reference) = s.get_local(name) {
            return Some(reference);
        }
        current = s.parent();
    }
    None
}

/// The result of resolving a name: a handle supporting `get`, and (if the
/// binding is mutable) `set`.
#[derive(Clone, Debug)]
pub enum Reference {
    /// A plain binding cell.
    Slot(SlotRef),
    /// A get-only binding (globals, built-ins).
    Constant(Value),
    /// A dictionary entry in a map-backed scope.
    MapEntry(MapEntryRef),
    /// A host object member, routed through the interop layer.
    Member(MemberRef),
}

impl Reference {
    /// A reference to a host object member, for member assignment targets.
    pub fn member(interop: HostHandle, object: HostObject, member: Name) -> Reference {
        Reference::Member(MemberRef {
            interop,
            object,
            member,
        })
    }

    /// Read the current value.
    pub fn get(&self) -> Result<Value, EvalError> {
        match self {
            Reference::Slot(slot) => Ok(slot.cell.get()),
            Reference::Constant(value) => Ok(value.clone()),
            Reference::MapEntry(entry) => Ok(entry.get()),
            Reference::Member(member) => member.get(),
        }
    }

    /// Write a value through the reference.
    pub fn set(&self, value: Value) -> Result<(), AssignError> {
        match self {
            Reference::Slot(slot) => {
                if !slot.mutability.is_mutable() {
                    return Err(AssignError::ReadOnly);
                }
                slot.cell.set(value);
                Ok(())
            }
            Reference::Constant(_) => Err(AssignError::ReadOnly),
            Reference::MapEntry(entry) => {
                entry.set(value);
                Ok(())
            }
            Reference::Member(member) => member.set(value).map_err(AssignError::Host),
        }
    }

    /// Whether `set` can succeed.
    pub fn is_mutable(&self) -> bool {
        match self {
            Reference::Slot(slot) => slot.mutability.is_mutable(),
            Reference::Constant(_) => false,
            Reference::MapEntry(_) | Reference::Member(_) => true,
        }
    }
}

/// Reference to a plain binding cell.
#[derive(Clone, Debug)]
pub struct SlotRef {
    pub(crate) cell: SharedCell<Value>,
    pub(crate) mutability: Mutability,
}

/// Reference to an entry of a map-backed scope.
#[derive(Clone, Debug)]
pub struct MapEntryRef {
    pub(crate) entries: SharedCell<FxHashMap<Name, Value>>,
    pub(crate) key: Name,
}

impl MapEntryRef {
    fn get(&self) -> Value {
        self.entries
            .read()
            .get(&self.key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn set(&self, value: Value) {
        self.entries.write().insert(self.key, value);
    }
}

/// Reference to a host object member.
#[derive(Clone)]
pub struct MemberRef {
    pub(crate) interop: HostHandle,
    pub(crate) object: HostObject,
    pub(crate) member: Name,
}

impl MemberRef {
    fn get(&self) -> Result<Value, EvalError> {
        self.interop.get_member(&self.object, self.member)
    }

    fn set(&self, value: Value) -> Result<(), EvalError> {
        self.interop.set_member(&self.object, self.member, value)
    }
}

impl fmt::Debug for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MemberRef(object={:?}, member={:?})",
            self.object, self.member
        )
    }
}
