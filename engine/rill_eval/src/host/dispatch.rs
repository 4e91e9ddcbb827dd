//! Overload resolution and invocation.
//!
//! Given a target (instance or host type), a member name, and evaluated
//! argument values: enumerate candidates, filter by arity, rank by
//! assignability (exact matches beat assignable-but-wider, non-variadic
//! beats variadic), coerce, invoke, and cache the selection. Assignability
//! queries are memoized per resolution context so each supertype edge is
//! examined exactly once per call.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use rill_ir::{Name, StringInterner};
use rill_runtime::{
    host_call_failed, no_applicable_candidate, Candidate, EvalError, HostInterop, HostObject,
    HostTypeId, Value,
};

use super::cache::{ResolutionCache, ResolutionKey};

/// What a member call is aimed at.
#[derive(Clone, Copy)]
pub(crate) enum DispatchTarget<'a> {
    /// An instance call on a host object.
    Instance(&'a HostObject),
    /// A static call on a host type.
    Static(HostTypeId),
}

impl DispatchTarget<'_> {
    fn type_id(&self) -> HostTypeId {
        match self {
            DispatchTarget::Instance(obj) => obj.type_id(),
            DispatchTarget::Static(ty) => *ty,
        }
    }

    fn is_static(&self) -> bool {
        matches!(self, DispatchTarget::Static(_))
    }

    fn receiver(&self) -> Option<&HostObject> {
        match self {
            DispatchTarget::Instance(obj) => Some(obj),
            DispatchTarget::Static(_) => None,
        }
    }
}

/// Result of dispatching a member call.
pub(crate) enum DispatchOutcome {
    /// A candidate was invoked; this is its result.
    Invoked(Value),
    /// No callable candidates exist, but the member is a readable field
    /// whose value the caller may apply as an ordinary function.
    FieldValue(Value),
}

/// One attempted call: the signature under resolution plus the per-call
/// assignability memo.
struct CallResolution<'a> {
    interop: &'a dyn HostInterop,
    ty: HostTypeId,
    member: Name,
    is_static: bool,
    arg_types: SmallVec<[HostTypeId; 4]>,
    /// Memoized `is_assignable` answers: each supertype/interface edge is
    /// examined once per call, however many candidates mention it.
    assignable: FxHashMap<(u32, u32), bool>,
}

impl<'a> CallResolution<'a> {
    fn new(
        interop: &'a dyn HostInterop,
        target: &DispatchTarget<'_>,
        member: Name,
        args: &[Value],
    ) -> Self {
        let arg_types = args.iter().map(|arg| interop.value_type(arg)).collect();
        CallResolution {
            interop,
            ty: target.type_id(),
            member,
            is_static: target.is_static(),
            arg_types,
            assignable: FxHashMap::default(),
        }
    }

    fn key(&self) -> ResolutionKey {
        ResolutionKey {
            ty: self.ty,
            member: self.member,
            is_static: self.is_static,
            arg_types: self.arg_types.clone(),
        }
    }

    fn is_assignable(&mut self, from: HostTypeId, to: HostTypeId) -> bool {
        if from == to {
            return true;
        }
        *self
            .assignable
            .entry((from.raw(), to.raw()))
            .or_insert_with(|| self.interop.is_assignable(from, to))
    }

    /// Score a candidate: `None` when any argument cannot bind, otherwise
    /// the number of exact type matches (higher is better).
    fn score(&mut self, candidate: &Candidate) -> Option<usize> {
        if !candidate.accepts_arity(self.arg_types.len()) {
            return None;
        }
        let params = &candidate.param_types;
        let mut exact = 0usize;
        for i in 0..self.arg_types.len() {
            let arg_ty = self.arg_types[i];
            let declared = if candidate.variadic && i + 1 >= params.len() {
                params[params.len() - 1]
            } else {
                params[i]
            };
            if arg_ty == declared {
                exact += 1;
            } else if !self.is_assignable(arg_ty, declared) {
                return None;
            }
        }
        Some(exact)
    }

    /// Pick the unique best candidate: most exact matches, non-variadic
    /// over variadic, first-enumerated on a residual tie.
    fn select(&mut self, candidates: &[Candidate]) -> Option<Candidate> {
        let mut best: Option<(usize, bool, &Candidate)> = None;
        for candidate in candidates {
            let Some(exact) = self.score(candidate) else {
                continue;
            };
            let fixed = !candidate.variadic;
            let better = match &best {
                None => true,
                Some((best_exact, best_fixed, _)) => {
                    exact > *best_exact || (exact == *best_exact && fixed && !best_fixed)
                }
            };
            if better {
                best = Some((exact, fixed, candidate));
            }
        }
        best.map(|(_, _, candidate)| candidate.clone())
    }

    fn arg_type_names(&self) -> String {
        self.arg_types
            .iter()
            .map(|&ty| self.interop.type_name(ty))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Dispatch a member call against a host target.
pub(crate) fn dispatch_member_call(
    interop: &dyn HostInterop,
    cache: &ResolutionCache,
    interner: &StringInterner,
    target: DispatchTarget<'_>,
    member: Name,
    args: &[Value],
) -> Result<DispatchOutcome, EvalError> {
    let mut resolution = CallResolution::new(interop, &target, member, args);
    let key = resolution.key();

    if let Some(candidate) = cache.get(&key) {
        trace!(member = interner.lookup(member), "host resolution cache hit");
        return invoke(interop, interner, &target, member, &candidate, args).map(DispatchOutcome::Invoked);
    }

    let candidates = interop.candidates(resolution.ty, member, resolution.is_static);
    if candidates.is_empty() {
        // No callables at all: fall back to a field read. A callable field
        // value is applied by the caller like any other function value.
        if let Some(receiver) = target.receiver() {
            if interop.has_member(receiver, member) {
                return interop
                    .get_member(receiver, member)
                    .map(DispatchOutcome::FieldValue);
            }
        }
        return Err(no_applicable_candidate(
            &interop.type_name(resolution.ty),
            interner.lookup(member),
            &resolution.arg_type_names(),
        ));
    }

    let Some(selected) = resolution.select(&candidates) else {
        return Err(no_applicable_candidate(
            &interop.type_name(resolution.ty),
            interner.lookup(member),
            &resolution.arg_type_names(),
        ));
    };

    trace!(
        member = interner.lookup(member),
        token = selected.token,
        "host resolution cache miss"
    );
    // Insert-if-absent: when two threads race, both end up invoking the
    // entry that actually got cached.
    let cached = cache.insert_if_absent(key, selected);
    invoke(interop, interner, &target, member, &cached, args).map(DispatchOutcome::Invoked)
}

/// Coerce arguments to the candidate's declared types (packing a variadic
/// tail into one tuple) and invoke.
fn invoke(
    interop: &dyn HostInterop,
    interner: &StringInterner,
    target: &DispatchTarget<'_>,
    member: Name,
    candidate: &Candidate,
    args: &[Value],
) -> Result<Value, EvalError> {
    let type_name = interop.type_name(target.type_id());
    let member_name = interner.lookup(member);
    let params = &candidate.param_types;

    let coerce_one = |value: &Value, to: HostTypeId| -> Result<Value, EvalError> {
        interop.coerce(value, to).ok_or_else(|| {
            host_call_failed(
                &type_name,
                member_name,
                &format!(
                    "cannot convert {} to {}",
                    value.type_name(),
                    interop.type_name(to)
                ),
            )
        })
    };

    let mut coerced = Vec::with_capacity(params.len());
    if candidate.variadic {
        let fixed = params.len().saturating_sub(1);
        for (value, &ty) in args.iter().take(fixed).zip(params.iter()) {
            coerced.push(coerce_one(value, ty)?);
        }
        let elem_ty = params[fixed];
        let tail = args[fixed.min(args.len())..]
            .iter()
            .map(|value| coerce_one(value, elem_ty))
            .collect::<Result<Vec<_>, _>>()?;
        coerced.push(Value::tuple(tail));
    } else {
        for (value, &ty) in args.iter().zip(params.iter()) {
            coerced.push(coerce_one(value, ty)?);
        }
    }

    interop
        .invoke(candidate, target.receiver(), &coerced)
        .map_err(|detail| host_call_failed(&type_name, member_name, &detail))
}
