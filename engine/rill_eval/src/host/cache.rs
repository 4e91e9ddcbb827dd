//! Overload-resolution cache.
//!
//! Keyed by the immutable call signature (declaring type, member name,
//! static flag, argument-type list). Entries are inserted once and never
//! mutated in place; when two threads race to resolve the same signature,
//! the first insert wins and both observe the same selection. The cache is
//! purely an optimization — host types are assumed stable for the process
//! lifetime, so entries are never invalidated.

use dashmap::DashMap;
use smallvec::SmallVec;

use rill_ir::Name;
use rill_runtime::{Candidate, HostTypeId};

/// Immutable signature of one attempted call.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ResolutionKey {
    pub ty: HostTypeId,
    pub member: Name,
    pub is_static: bool,
    pub arg_types: SmallVec<[HostTypeId; 4]>,
}

/// Shared cache of resolved candidates.
#[derive(Default, Debug)]
pub(crate) struct ResolutionCache {
    entries: DashMap<ResolutionKey, Candidate>,
}

impl ResolutionCache {
    /// Look up a cached resolution.
    pub(crate) fn get(&self, key: &ResolutionKey) -> Option<Candidate> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Insert a resolution unless one is already present; returns the
    /// entry that ended up cached, which callers must use so a lost race
    /// cannot change the observed selection.
    pub(crate) fn insert_if_absent(&self, key: ResolutionKey, candidate: Candidate) -> Candidate {
        self.entries.entry(key).or_insert(candidate).value().clone()
    }

    /// Number of cached resolutions.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
