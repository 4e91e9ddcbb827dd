//! RAII guard for scope entry and exit.
//!
//! The interpreter swaps the current scope in and out rather than pushing
//! a stack; this guard restores the previous scope when dropped — on the
//! success path, on `?` propagation, and during unwinding alike.

use std::mem;
use std::ops::{Deref, DerefMut};

use rill_runtime::ScopeHandle;

use super::Interpreter;

/// Guard that restores the interpreter's previous scope on drop.
///
/// Access the interpreter through this guard — it implements `Deref` and
/// `DerefMut`, so evaluation reads exactly like it does on the bare
/// interpreter.
pub(crate) struct ScopedEnv<'g, 'a> {
    interp: &'g mut Interpreter<'a>,
    prev: Option<ScopeHandle>,
}

impl<'a> Interpreter<'a> {
    /// Swap `scope` in as the current scope; the returned guard swaps the
    /// previous one back when it goes out of scope.
    pub(crate) fn enter_scope(&mut self, scope: ScopeHandle) -> ScopedEnv<'_, 'a> {
        let prev = mem::replace(&mut self.env, scope);
        ScopedEnv {
            interp: self,
            prev: Some(prev),
        }
    }
}

impl Drop for ScopedEnv<'_, '_> {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            self.interp.env = prev;
        }
    }
}

impl<'a> Deref for ScopedEnv<'_, 'a> {
    type Target = Interpreter<'a>;

    fn deref(&self) -> &Self::Target {
        self.interp
    }
}

impl DerefMut for ScopedEnv<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interp
    }
}
