//! Function values (closures).
//!
//! A `FunctionValue` pairs a `Function` AST node (shared, never cloned)
//! with the scope captured when the node was evaluated. Later mutations to
//! variables visible in that captured scope are visible to the closure; the
//! chain itself is fixed at capture time.

use std::fmt;
use std::sync::Arc;

use rill_ir::{ExprId, Name, Param, ParamRange, SharedArena};

use crate::scope::ScopeHandle;

struct FunctionInner {
    /// Arena owning the function's AST; evaluation of the body must use
    /// this arena, not the caller's.
    arena: SharedArena,
    params: ParamRange,
    body: ExprId,
    sub_scope: bool,
    captured: ScopeHandle,
    /// Bound functions catch their own `return`. Set when the closure is
    /// assigned to a variable.
    bound: bool,
    /// Diagnostic name; `Name::EMPTY` for anonymous closures.
    name: Name,
}

/// A closure value.
///
/// Cheap to clone (a shared handle). Equality is identity: two closures are
/// equal only if they are the same creation (binding produces a distinct
/// identity that shares body and captured scope).
#[derive(Clone)]
pub struct FunctionValue(Arc<FunctionInner>);

impl FunctionValue {
    /// Create a closure from a `Function` node and the scope in force at
    /// the moment the node evaluated.
    pub fn new(
        arena: SharedArena,
        params: ParamRange,
        body: ExprId,
        sub_scope: bool,
        captured: ScopeHandle,
    ) -> Self {
        FunctionValue(Arc::new(FunctionInner {
            arena,
            params,
            body,
            sub_scope,
            captured,
            bound: false,
            name: Name::EMPTY,
        }))
    }

    /// A bound copy of this closure, named after its assignment target.
    ///
    /// The bound copy shares the body and captured scope; only the call
    /// boundary behavior (and the diagnostic name) changes.
    #[must_use]
    pub fn bind(&self, name: Name) -> Self {
        FunctionValue(Arc::new(FunctionInner {
            arena: self.0.arena.clone(),
            params: self.0.params,
            body: self.0.body,
            sub_scope: self.0.sub_scope,
            captured: self.0.captured.clone(),
            bound: true,
            name,
        }))
    }

    #[inline]
    pub fn arena(&self) -> &SharedArena {
        &self.0.arena
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        self.0.arena.params(self.0.params)
    }

    #[inline]
    pub fn body(&self) -> ExprId {
        self.0.body
    }

    #[inline]
    pub fn sub_scope(&self) -> bool {
        self.0.sub_scope
    }

    #[inline]
    pub fn captured(&self) -> &ScopeHandle {
        &self.0.captured
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.0.bound
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.0.name
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionValue")
            .field("params", &self.params().len())
            .field("sub_scope", &self.0.sub_scope)
            .field("bound", &self.0.bound)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        FunctionValue::ptr_eq(self, other)
    }
}
