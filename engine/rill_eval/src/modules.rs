//! Module registry.
//!
//! A module's body runs once; the resulting scope-value is memoized
//! engine-wide by name. Re-entering a module before its own initialization
//! completes is a circular-dependency error. The registry is the only
//! insert path that module registration has — the global built-ins table
//! stays immutable.

use dashmap::DashMap;
use tracing::debug;

use rill_ir::Name;
use rill_runtime::{circular_module, EvalError, Value};

#[derive(Clone, Debug)]
enum ModuleSlot {
    /// Body evaluation in progress on some thread.
    Initializing,
    /// Initialization finished; the memoized module value.
    Ready(Value),
}

/// Engine-wide module memoization table.
#[derive(Default, Debug)]
pub(crate) struct ModuleRegistry {
    slots: DashMap<Name, ModuleSlot>,
}

impl ModuleRegistry {
    /// Begin initializing `name`.
    ///
    /// Returns the memoized value when the module is already initialized,
    /// `None` after marking it in-progress, or the circular-dependency
    /// error when it is re-entered before completing.
    pub(crate) fn begin(&self, name: Name, display: &str) -> Result<Option<Value>, EvalError> {
        match self.slots.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(entry) => match entry.get() {
                ModuleSlot::Ready(value) => Ok(Some(value.clone())),
                ModuleSlot::Initializing => Err(circular_module(display)),
            },
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(ModuleSlot::Initializing);
                Ok(None)
            }
        }
    }

    /// Record a finished initialization.
    pub(crate) fn finish(&self, name: Name, display_name: &str, value: Value) {
        debug!(module = %display_name, "module initialized");
        self.slots.insert(name, ModuleSlot::Ready(value));
    }

    /// Drop an in-progress marker after a failed initialization, so a
    /// later evaluation can retry.
    pub(crate) fn abort(&self, name: Name) {
        self.slots.remove(&name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_begin_marks_in_progress() {
        let registry = ModuleRegistry::default();
        let name = Name::from_raw(1);
        assert!(matches!(registry.begin(name, "m"), Ok(None)));
        // Re-entry before finish is circular
        assert!(registry.begin(name, "m").is_err());
    }

    #[test]
    fn finish_memoizes() {
        let registry = ModuleRegistry::default();
        let name = Name::from_raw(1);
        registry.begin(name, "m").ok();
        registry.finish(name, "m", Value::number(5));
        let again = registry.begin(name, "m");
        assert!(matches!(again, Ok(Some(v)) if v == Value::number(5)));
    }

    #[test]
    fn abort_allows_retry() {
        let registry = ModuleRegistry::default();
        let name = Name::from_raw(1);
        registry.begin(name, "m").ok();
        registry.abort(name);
        assert!(matches!(registry.begin(name, "m"), Ok(None)));
    }
}
