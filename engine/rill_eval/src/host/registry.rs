//! Reference host-interop provider.
//!
//! An explicit registry of host types, methods, and fields. Embeddings
//! that don't need reflection-style discovery register what they export
//! and hand the frozen registry to the engine; the test suite uses it as
//! its host. The built-in script types are pre-registered so
//! `value_type` is total.
//!
//! Candidates are enumerated in registration order, which makes overload
//! selection (and the shared resolution cache) deterministic.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use rill_ir::{Name, SharedInterner};
use rill_runtime::{
    assign_to_constant, undefined_member, Candidate, EvalError, HostInterop, HostObject,
    HostTypeId, Value,
};

/// Method implementation. `receiver` is `None` for static methods.
pub type HostMethodFn = fn(Option<&HostObject>, &[Value]) -> Result<Value, String>;

/// Field getter.
pub type HostFieldGetFn = fn(&HostObject) -> Result<Value, String>;

/// Field setter.
pub type HostFieldSetFn = fn(&HostObject, Value) -> Result<(), String>;

/// Ids of the pre-registered script types.
///
/// Every runtime value has one of these as its host type unless it is a
/// `HostObject`, which carries its own.
#[derive(Clone, Copy, Debug)]
pub struct ScriptTypes {
    pub null: HostTypeId,
    pub boolean: HostTypeId,
    pub number: HostTypeId,
    pub string: HostTypeId,
    pub tuple: HostTypeId,
    pub function: HostTypeId,
    pub scope: HostTypeId,
}

struct TypeEntry {
    name: String,
    supers: Vec<HostTypeId>,
    /// Member name → overload set; each entry indexes `callables` and
    /// doubles as the candidate token.
    methods: FxHashMap<Name, Vec<usize>>,
    fields: FxHashMap<Name, FieldEntry>,
}

struct FieldEntry {
    getter: HostFieldGetFn,
    setter: Option<HostFieldSetFn>,
}

struct CallableEntry {
    param_types: Arc<[HostTypeId]>,
    variadic: bool,
    is_static: bool,
    f: HostMethodFn,
}

/// Registry of host types, methods, and fields.
///
/// Build mutably, then freeze behind an `Arc` as the engine's provider.
pub struct HostRegistry {
    interner: SharedInterner,
    types: Vec<TypeEntry>,
    callables: Vec<CallableEntry>,
    script: ScriptTypes,
}

impl HostRegistry {
    pub fn new(interner: SharedInterner) -> Self {
        let placeholder = HostTypeId::new(0);
        let mut registry = HostRegistry {
            interner,
            types: Vec::new(),
            callables: Vec::new(),
            script: ScriptTypes {
                null: placeholder,
                boolean: placeholder,
                number: placeholder,
                string: placeholder,
                tuple: placeholder,
                function: placeholder,
                scope: placeholder,
            },
        };
        registry.script = ScriptTypes {
            null: registry.add_type("null", &[]),
            boolean: registry.add_type("boolean", &[]),
            number: registry.add_type("number", &[]),
            string: registry.add_type("string", &[]),
            tuple: registry.add_type("tuple", &[]),
            function: registry.add_type("function", &[]),
            scope: registry.add_type("scope", &[]),
        };
        registry
    }

    /// The pre-registered script type ids.
    pub fn script_types(&self) -> ScriptTypes {
        self.script
    }

    /// Register a host type with its supertypes.
    pub fn add_type(&mut self, name: &str, supers: &[HostTypeId]) -> HostTypeId {
        let id = HostTypeId::new(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(TypeEntry {
            name: name.to_owned(),
            supers: supers.to_vec(),
            methods: FxHashMap::default(),
            fields: FxHashMap::default(),
        });
        id
    }

    /// Register a method overload on a type. Overloads for one member
    /// accumulate in registration order. Constructors go under the member
    /// name `new` with `is_static = true`.
    pub fn add_method(
        &mut self,
        ty: HostTypeId,
        member: &str,
        param_types: &[HostTypeId],
        variadic: bool,
        is_static: bool,
        f: HostMethodFn,
    ) {
        let member = self.interner.intern(member);
        let callable = self.callables.len();
        self.callables.push(CallableEntry {
            param_types: Arc::from(param_types),
            variadic,
            is_static,
            f,
        });
        if let Some(entry) = self.types.get_mut(ty.raw() as usize) {
            entry.methods.entry(member).or_default().push(callable);
        }
    }

    /// Register a field with a getter and optional setter.
    pub fn add_field(
        &mut self,
        ty: HostTypeId,
        member: &str,
        getter: HostFieldGetFn,
        setter: Option<HostFieldSetFn>,
    ) {
        let member = self.interner.intern(member);
        if let Some(entry) = self.types.get_mut(ty.raw() as usize) {
            entry.fields.insert(member, FieldEntry { getter, setter });
        }
    }

    fn entry(&self, ty: HostTypeId) -> Option<&TypeEntry> {
        self.types.get(ty.raw() as usize)
    }

    /// Depth-first walk of the supertype graph.
    fn assignable_via_supers(&self, from: HostTypeId, to: HostTypeId) -> bool {
        if from == to {
            return true;
        }
        let Some(entry) = self.entry(from) else {
            return false;
        };
        entry
            .supers
            .iter()
            .any(|&sup| self.assignable_via_supers(sup, to))
    }

    /// Field lookup walking the supertype chain.
    fn find_field(&self, ty: HostTypeId, member: Name) -> Option<&FieldEntry> {
        let entry = self.entry(ty)?;
        if let Some(field) = entry.fields.get(&member) {
            return Some(field);
        }
        entry
            .supers
            .iter()
            .find_map(|&sup| self.find_field(sup, member))
    }

    /// Collect method overloads for a member on `ty` and its supertypes.
    fn collect_candidates(
        &self,
        ty: HostTypeId,
        member: Name,
        is_static: bool,
        out: &mut Vec<Candidate>,
    ) {
        if let Some(entry) = self.entry(ty) {
            if let Some(slots) = entry.methods.get(&member) {
                for &callable_ix in slots {
                    let callable = &self.callables[callable_ix];
                    if callable.is_static == is_static {
                        out.push(Candidate {
                            token: callable_ix as u64,
                            param_types: Arc::clone(&callable.param_types),
                            variadic: callable.variadic,
                            is_static: callable.is_static,
                        });
                    }
                }
            }
            for &sup in &entry.supers {
                self.collect_candidates(sup, member, is_static, out);
            }
        }
    }
}

impl HostInterop for HostRegistry {
    fn type_name(&self, ty: HostTypeId) -> String {
        self.entry(ty)
            .map_or_else(|| format!("type#{}", ty.raw()), |entry| entry.name.clone())
    }

    fn value_type(&self, value: &Value) -> HostTypeId {
        match value {
            Value::Null => self.script.null,
            Value::Bool(_) => self.script.boolean,
            Value::Number(_) => self.script.number,
            Value::Str(_) | Value::Interp(_) => self.script.string,
            Value::Tuple(_) => self.script.tuple,
            Value::Function(_) | Value::Native(_, _) => self.script.function,
            Value::Scope(_) => self.script.scope,
            Value::HostObject(obj) => obj.type_id(),
            Value::HostType(ty) => *ty,
        }
    }

    fn candidates(&self, ty: HostTypeId, member: Name, is_static: bool) -> Vec<Candidate> {
        let mut out = Vec::new();
        self.collect_candidates(ty, member, is_static, &mut out);
        out
    }

    fn is_assignable(&self, from: HostTypeId, to: HostTypeId) -> bool {
        // Null binds to any host type, mirroring the usual host-language
        // reference semantics.
        if from == self.script.null {
            return true;
        }
        self.assignable_via_supers(from, to)
    }

    fn coerce(&self, value: &Value, to: HostTypeId) -> Option<Value> {
        let from = self.value_type(value);
        if from == to || self.is_assignable(from, to) {
            // Hand strings to hosts materialized, so providers never see
            // a half-rendered interpolation.
            if let Value::Interp(interp) = value {
                return Some(Value::string(interp.text().to_owned()));
            }
            return Some(value.clone());
        }
        None
    }

    fn invoke(
        &self,
        candidate: &Candidate,
        receiver: Option<&HostObject>,
        args: &[Value],
    ) -> Result<Value, String> {
        let callable = self
            .callables
            .get(usize::try_from(candidate.token).unwrap_or(usize::MAX))
            .ok_or_else(|| "unknown candidate token".to_owned())?;
        (callable.f)(receiver, args)
    }

    fn has_member(&self, obj: &HostObject, member: Name) -> bool {
        self.find_field(obj.type_id(), member).is_some()
    }

    fn get_member(&self, obj: &HostObject, member: Name) -> Result<Value, EvalError> {
        let Some(field) = self.find_field(obj.type_id(), member) else {
            return Err(undefined_member(
                &self.type_name(obj.type_id()),
                self.interner.lookup(member),
            ));
        };
        (field.getter)(obj).map_err(EvalError::new)
    }

    fn set_member(&self, obj: &HostObject, member: Name, value: Value) -> Result<(), EvalError> {
        let Some(field) = self.find_field(obj.type_id(), member) else {
            return Err(undefined_member(
                &self.type_name(obj.type_id()),
                self.interner.lookup(member),
            ));
        };
        let Some(setter) = field.setter else {
            return Err(assign_to_constant(self.interner.lookup(member)));
        };
        setter(obj, value).map_err(EvalError::new)
    }
}
