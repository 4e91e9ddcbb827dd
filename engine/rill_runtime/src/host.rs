//! Host-interop contract.
//!
//! Script code can call methods and read/write fields on opaque host
//! objects whose shape is discovered at call time. The evaluator depends
//! only on the [`HostInterop`] trait; concrete providers may be built on a
//! manual registry, reflection-style metadata, or FFI bindings.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rill_ir::Name;

use crate::errors::EvalError;
use crate::Value;

/// Identifier of a host type within one provider.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct HostTypeId(u32);

impl HostTypeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        HostTypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// An opaque externally-typed value.
///
/// The payload is provider-defined; the evaluator only threads it through
/// the interop calls. Equality is identity.
#[derive(Clone)]
pub struct HostObject {
    type_id: HostTypeId,
    data: Arc<dyn Any + Send + Sync>,
}

impl HostObject {
    pub fn new(type_id: HostTypeId, data: Arc<dyn Any + Send + Sync>) -> Self {
        HostObject { type_id, data }
    }

    #[inline]
    pub fn type_id(&self) -> HostTypeId {
        self.type_id
    }

    /// Downcast the payload to a concrete provider type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref::<T>()
    }

    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.data, &b.data)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostObject(type={})", self.type_id.raw())
    }
}

impl PartialEq for HostObject {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && HostObject::ptr_eq(self, other)
    }
}

/// A callable member candidate enumerated by a provider.
///
/// `token` is provider-opaque and round-trips through [`HostInterop::invoke`].
/// For a variadic candidate, the last entry of `param_types` is the element
/// type of the packed tail.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub token: u64,
    pub param_types: Arc<[HostTypeId]>,
    pub variadic: bool,
    pub is_static: bool,
}

impl Candidate {
    /// Whether `argc` supplied arguments can bind to this candidate.
    pub fn accepts_arity(&self, argc: usize) -> bool {
        if self.variadic {
            argc + 1 >= self.param_types.len()
        } else {
            argc == self.param_types.len()
        }
    }
}

/// Capability through which the evaluator reaches host objects.
///
/// The contract mirrors what overload resolution needs and nothing more:
/// enumerate candidates, compare types, coerce, invoke, and read/write
/// fields. Providers enumerate candidates deterministically so that
/// resolution (and the shared resolution cache) is stable.
pub trait HostInterop: Send + Sync {
    /// Display name of a host type, for error messages.
    fn type_name(&self, ty: HostTypeId) -> String;

    /// Runtime host type of any value (script values included, so that
    /// overload ranking is total).
    fn value_type(&self, value: &Value) -> HostTypeId;

    /// Candidate callables for `member` on `ty`. Providers enumerate
    /// constructors under the member name `new`.
    fn candidates(&self, ty: HostTypeId, member: Name, is_static: bool) -> Vec<Candidate>;

    /// Whether a value of type `from` may bind to a parameter of type `to`.
    /// Reflexive; providers resolve supertype/interface edges here.
    fn is_assignable(&self, from: HostTypeId, to: HostTypeId) -> bool;

    /// Convert `value` to the representation a parameter of type `to`
    /// expects. `None` when no conversion exists.
    fn coerce(&self, value: &Value, to: HostTypeId) -> Option<Value>;

    /// Invoke a resolved candidate. `receiver` is `None` for static calls.
    /// Failures are provider-level details; the dispatcher wraps them with
    /// the script call trail.
    fn invoke(
        &self,
        candidate: &Candidate,
        receiver: Option<&HostObject>,
        args: &[Value],
    ) -> Result<Value, String>;

    /// Whether the object exposes `member` as a readable field.
    fn has_member(&self, obj: &HostObject, member: Name) -> bool;

    /// Read a field.
    fn get_member(&self, obj: &HostObject, member: Name) -> Result<Value, EvalError>;

    /// Write a field.
    fn set_member(&self, obj: &HostObject, member: Name, value: Value) -> Result<(), EvalError>;
}

/// Shared handle to a provider.
pub type HostHandle = Arc<dyn HostInterop>;
