//! Rill Eval - tree-walking evaluator for the rill expression language.
//!
//! # Architecture
//!
//! - [`Engine`] / [`EngineBuilder`]: shared state — frozen globals, the
//!   host-interop provider, the overload-resolution cache, the module
//!   registry — plus the embedder entry point `Engine::evaluate`
//! - `interpreter`: the per-invocation execution context (current scope,
//!   diagnostic call stack) and expression dispatch
//! - `exec`: control flow and the closure call protocol
//! - `host`: overload resolution against host objects and the reference
//!   [`HostRegistry`] provider
//! - [`evaluate_binary`] / [`evaluate_unary`]: value-level operator
//!   dispatch with checked decimal arithmetic
//! - [`standard_globals`]: the stock built-ins table
//!
//! Value, scope, and error types are re-exported from `rill_runtime` for
//! convenience.

mod builtins;
mod diagnostics;
mod engine;
mod exec;
mod host;
mod interpreter;
mod modules;
mod operators;
mod stack;

pub use builtins::standard_globals;
pub use diagnostics::{CallFrame, CallStack};
pub use engine::{Engine, EngineBuilder};
pub use host::HostRegistry;
pub use host::registry::{HostFieldGetFn, HostFieldSetFn, HostMethodFn, ScriptTypes};
pub use operators::{evaluate_binary, evaluate_unary};
pub use stack::ensure_sufficient_stack;

// Re-export the runtime model for embedders
pub use rill_runtime::{
    Candidate, Control, DefaultScope, EvalBacktrace, EvalError, EvalErrorKind, EvalResult,
    FunctionValue, GlobalScope, GlobalScopeBuilder, HostHandle, HostInterop, HostObject,
    HostTypeId, InterpPart, InterpString, MapScope, Mutability, Reference, Scope, ScopeHandle,
    Value,
};
