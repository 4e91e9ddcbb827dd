//! Host-interop dispatch.
//!
//! Routes script calls and field accesses against opaque host objects:
//! candidate enumeration, overload ranking, coercion, invocation, and the
//! process-wide resolution cache. The provider behind it all is the
//! `HostInterop` trait from `rill_runtime`; the [`registry`] module ships
//! the reference provider.

mod cache;
mod dispatch;
pub mod registry;

pub(crate) use cache::ResolutionCache;
pub(crate) use dispatch::{dispatch_member_call, DispatchOutcome, DispatchTarget};
pub use registry::HostRegistry;
