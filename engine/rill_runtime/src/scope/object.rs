//! Host-object-backed scope.
//!
//! Routes lookups and assignments through the host-interop layer, reading
//! and writing the object's members. `declare` fails: a foreign object's
//! member set is fixed externally.

use std::fmt;
use std::sync::Arc;

use rill_ir::Name;

use crate::errors::{declare_unsupported, EvalError};
use crate::host::{HostHandle, HostObject};
use crate::Value;

use super::{MemberRef, Mutability, Reference, Scope, ScopeHandle};

pub struct ObjectScope {
    interop: HostHandle,
    object: HostObject,
}

impl ObjectScope {
    pub fn new(interop: HostHandle, object: HostObject) -> Arc<Self> {
        Arc::new(ObjectScope { interop, object })
    }

    /// The wrapped object.
    pub fn object(&self) -> &HostObject {
        &self.object
    }
}

impl Scope for ObjectScope {
    fn get_local(&self, name: Name) -> Option<Reference> {
        if self.interop.has_member(&self.object, name) {
            Some(Reference::Member(MemberRef {
                interop: Arc::clone(&self.interop),
                object: self.object.clone(),
                member: name,
            }))
        } else {
            None
        }
    }

    fn declare(&self, _name: Name, _value: Value, _mutability: Mutability) -> Result<(), EvalError> {
        Err(declare_unsupported("an object-backed scope"))
    }

    fn parent(&self) -> Option<ScopeHandle> {
        // An object layer stands alone; `with` chains it through a
        // combined scope instead.
        None
    }
}

impl fmt::Debug for ObjectScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectScope({:?})", self.object)
    }
}
