//! Combined scope.
//!
//! Layers a primary scope over a secondary one, so a `with`/module block
//! shadows outer names without losing access to them. Declarations go to
//! the primary.

use std::fmt;
use std::sync::Arc;

use rill_ir::Name;

use crate::errors::EvalError;
use crate::Value;

use super::{resolve_chain, Mutability, Reference, Scope, ScopeHandle};

pub struct CombinedScope {
    primary: ScopeHandle,
    secondary: ScopeHandle,
}

impl CombinedScope {
    pub fn layer(primary: ScopeHandle, secondary: ScopeHandle) -> Arc<Self> {
        Arc::new(CombinedScope { primary, secondary })
    }
}

impl Scope for CombinedScope {
    fn get_local(&self, name: Name) -> Option<Reference> {
        // The whole primary chain shadows the secondary.
        resolve_chain(&self.primary, name)
    }

    fn declare(&self, name: Name, value: Value, mutability: Mutability) -> Result<(), EvalError> {
        self.primary.declare(name, value, mutability)
    }

    fn parent(&self) -> Option<ScopeHandle> {
        Some(Arc::clone(&self.secondary))
    }
}

impl fmt::Debug for CombinedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CombinedScope(primary={:?}, secondary={:?})",
            self.primary, self.secondary
        )
    }
}
