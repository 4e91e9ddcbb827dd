//! The engine: shared evaluation state and the embedder entry point.
//!
//! An [`Engine`] owns everything shared between invocations and between
//! threads: the frozen global scope, the host-interop provider, the
//! overload-resolution cache, and the module registry. Each call to
//! [`Engine::evaluate`] runs on a fresh per-thread execution context, so
//! concurrent evaluations only share what the engine deliberately shares.

use std::sync::Arc;

use rill_ir::{ExprId, SharedArena, SharedInterner, StringInterner};
use rill_runtime::{EvalResult, GlobalScope, HostHandle, ScopeHandle};

use crate::host::{HostRegistry, ResolutionCache};
use crate::interpreter::Interpreter;
use crate::modules::ModuleRegistry;

/// Shared evaluation engine.
pub struct Engine {
    globals: Arc<GlobalScope>,
    interop: HostHandle,
    resolutions: ResolutionCache,
    modules: ModuleRegistry,
    max_depth: Option<usize>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Evaluate a root expression against an initial scope.
    ///
    /// The whole tree-walk runs to completion (or to an uncaught error) on
    /// the calling thread. A stray `return` reaching this boundary yields
    /// its value: the outermost invocation behaves as a bound call.
    pub fn evaluate(
        &self,
        arena: &SharedArena,
        interner: &StringInterner,
        root: ExprId,
        scope: ScopeHandle,
    ) -> EvalResult {
        let mut interp = Interpreter::new(self, interner, arena.clone(), scope);
        match interp.eval(root) {
            Ok(value) => Ok(value),
            Err(control) => control.into_result(),
        }
    }

    pub(crate) fn globals(&self) -> &GlobalScope {
        &self.globals
    }

    pub(crate) fn interop(&self) -> &HostHandle {
        &self.interop
    }

    pub(crate) fn resolutions(&self) -> &ResolutionCache {
        &self.resolutions
    }

    pub(crate) fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub(crate) fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }
}

/// Builder configuring an [`Engine`].
///
/// Everything is optional: the default engine has an empty global scope, a
/// bare [`HostRegistry`] as its provider, and no call-depth limit.
#[derive(Default)]
pub struct EngineBuilder {
    globals: Option<Arc<GlobalScope>>,
    interop: Option<HostHandle>,
    max_depth: Option<usize>,
}

impl EngineBuilder {
    /// Use a frozen global scope (see `standard_globals`).
    #[must_use]
    pub fn globals(mut self, globals: Arc<GlobalScope>) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Use a host-interop provider.
    #[must_use]
    pub fn interop(mut self, interop: HostHandle) -> Self {
        self.interop = Some(interop);
        self
    }

    /// Limit script call depth; exceeding it raises a recursion-limit
    /// error instead of exhausting the native stack.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            globals: self.globals.unwrap_or_else(GlobalScope::empty),
            interop: self
                .interop
                .unwrap_or_else(|| Arc::new(HostRegistry::new(SharedInterner::default()))),
            resolutions: ResolutionCache::default(),
            modules: ModuleRegistry::default(),
            max_depth: self.max_depth,
        }
    }
}
