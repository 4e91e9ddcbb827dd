//! Rill Runtime - values, scopes, and the host-interop contract.
//!
//! This crate holds the evaluator's runtime model:
//! - `Value`: tagged runtime values (null, boolean, decimal number, string,
//!   tuple, closure, host object, scope reference)
//! - Tuple semantics: single-value reduction, truthiness, and the
//!   flattening argument walker
//! - The scope chain: a `Scope` trait with block, parameter, map-backed,
//!   object-backed, combined, and global implementations
//! - `EvalError`/`Control`: the error taxonomy with call-trail snapshots
//!   and the tagged non-local-exit type
//! - `HostInterop`: the capability through which script code reaches
//!   opaque host objects
//!
//! The tree-walking evaluator itself lives in `rill_eval`.

pub mod errors;
mod heap;
mod host;
mod scope;
mod shared;
mod tuple;
mod value;

pub use errors::{
    // Error and control types
    BacktraceFrame, Control, EvalBacktrace, EvalError, EvalErrorKind, EvalResult, ExecResult,
    // Name resolution errors
    undefined_member, undefined_variable,
    // Call binding errors
    no_value_specified, not_callable, not_enough_parameters, parameter_undefined, spread_not_last,
    too_many_parameters,
    // Value shape errors
    assign_to_constant, declare_unsupported, invalid_assignment_target, tuple_arity_mismatch,
    tuple_to_scalar, type_mismatch,
    // Arithmetic errors
    division_by_zero, invalid_binary_op, numeric_overflow,
    // Host, module, and resource errors
    circular_module, host_call_failed, no_applicable_candidate, recursion_limit_exceeded,
    // Script throw
    thrown_value,
};
pub use heap::Heap;
pub use host::{Candidate, HostHandle, HostInterop, HostObject, HostTypeId};
pub use scope::{
    resolve_chain, AssignError, CombinedScope, DefaultScope, GlobalScope, GlobalScopeBuilder,
    MapEntryRef, MapScope, MemberRef, Mutability, ObjectScope, ParamScope, Reference, Scope,
    ScopeHandle, SlotRef,
};
pub use shared::SharedCell;
pub use tuple::{flatten_positional, spread_elements};
pub use value::{FunctionValue, InterpPart, InterpString, NativeFn, Value};
