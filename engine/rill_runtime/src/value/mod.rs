//! Runtime values for the rill evaluator.
//!
//! All heap allocations go through factory methods on `Value`; the
//! `Heap<T>` wrapper has a crate-private constructor, so external code
//! cannot create heap values directly.
//!
//! # Thread Safety
//!
//! Every variant is `Send + Sync`: heap types use `Arc` internally and
//! scope cells use `parking_lot::RwLock`. The concurrency contract itself
//! (one thread context per thread, externally synchronized shared closures)
//! is documented on the evaluator.

mod function;
mod interp;

use std::fmt;

use rust_decimal::Decimal;

use crate::errors::EvalError;
use crate::heap::Heap;
use crate::host::{HostObject, HostTypeId};
use crate::scope::ScopeHandle;

pub use function::FunctionValue;
pub use interp::{InterpPart, InterpString};

/// Built-in function signature.
///
/// Natives are plain function pointers installed in the global scope
/// (conversions like `number(x)`, `text(x)`).
pub type NativeFn = fn(&[Value]) -> Result<Value, EvalError>;

/// Runtime value in the rill evaluator.
#[derive(Clone)]
pub enum Value {
    /// Null (absent) value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Decimal number.
    Number(Decimal),
    /// String value.
    Str(Heap<String>),
    /// Lazily concatenated interpolated string.
    Interp(Heap<InterpString>),
    /// Ordered multi-value result; immutable once built.
    Tuple(Heap<Vec<Value>>),
    /// Closure.
    Function(FunctionValue),
    /// Built-in function.
    Native(NativeFn, &'static str),
    /// Opaque host object, dispatched through the interop layer.
    HostObject(HostObject),
    /// Host type handle, receiver for static host calls.
    HostType(HostTypeId),
    /// Scope reference (modules, `with` targets, initial scopes).
    Scope(ScopeHandle),
}

// Factory methods (the only way to construct heap values)

impl Value {
    /// Create a number value from an integer.
    #[inline]
    pub fn number(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }

    /// Create a number value from a decimal.
    #[inline]
    pub fn decimal(d: Decimal) -> Self {
        Value::Number(d)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create an interpolated-string value.
    #[inline]
    pub fn interp(s: InterpString) -> Self {
        Value::Interp(Heap::new(s))
    }

    /// Create a tuple value.
    #[inline]
    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(items))
    }

    /// The empty tuple.
    #[inline]
    pub fn unit() -> Self {
        Value::Tuple(Heap::new(Vec::new()))
    }
}

impl Value {
    /// Script-visible type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) | Value::Interp(_) => "string",
            Value::Tuple(_) => "tuple",
            Value::Function(_) => "function",
            Value::Native(_, _) => "builtin",
            Value::HostObject(_) => "object",
            Value::HostType(_) => "type",
            Value::Scope(_) => "scope",
        }
    }

    /// Truthiness.
    ///
    /// Null, false, zero, and the empty string are false. An empty tuple is
    /// false; a non-empty tuple takes its last element's truth, recursively.
    /// Functions, host objects, host types, and scopes are true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::Interp(s) => !s.text().is_empty(),
            Value::Tuple(items) => match items.last() {
                None => false,
                Some(last) => last.is_truthy(),
            },
            Value::Function(_)
            | Value::Native(_, _)
            | Value::HostObject(_)
            | Value::HostType(_)
            | Value::Scope(_) => true,
        }
    }

    /// Reduce to a single value.
    ///
    /// A tuple of size ≥ 1 reduces to its last element, recursively; the
    /// empty tuple reduces to null. Non-tuples are returned unchanged.
    pub fn single(self) -> Value {
        match self {
            Value::Tuple(items) => match items.last() {
                None => Value::Null,
                Some(last) => last.clone().single(),
            },
            other => other,
        }
    }

    /// Whether this value is a string (plain or interpolated).
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Interp(_))
    }

    /// Text content of a string value, materializing an interpolated
    /// string if needed. `None` for non-strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            Value::Interp(s) => Some(s.text()),
            _ => None,
        }
    }

    /// The decimal content of a number value.
    #[inline]
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Textual form used by string interpolation and `text()`.
    ///
    /// Null renders as the empty string: an absent value interpolated into
    /// a template must not leak the word "null".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", n.normalize()),
            Value::Str(s) => f.write_str(s),
            Value::Interp(s) => f.write_str(s.text()),
            Value::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            Value::Function(_) => f.write_str("<function>"),
            Value::Native(_, name) => write!(f, "<builtin {name}>"),
            Value::HostObject(_) => f.write_str("<object>"),
            Value::HostType(_) => f.write_str("<type>"),
            Value::Scope(_) => f.write_str("<scope>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::Interp(s) => write!(f, "Interp({:?})", s.text()),
            Value::Tuple(items) => f.debug_tuple("Tuple").field(&**items).finish(),
            Value::Function(func) => func.fmt(f),
            Value::Native(_, name) => write!(f, "Native({name})"),
            Value::HostObject(obj) => obj.fmt(f),
            Value::HostType(ty) => write!(f, "HostType({})", ty.raw()),
            Value::Scope(_) => f.write_str("Scope(..)"),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality for data values; identity for closures, host
    /// objects, and scopes. Plain and interpolated strings compare by text.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (a, b) if a.is_string() && b.is_string() => a.as_str() == b.as_str(),
            (Value::Tuple(a), Value::Tuple(b)) => **a == **b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Native(fa, na), Value::Native(fb, nb)) => {
                std::ptr::fn_addr_eq(*fa, *fb) && na == nb
            }
            (Value::HostObject(a), Value::HostObject(b)) => a == b,
            (Value::HostType(a), Value::HostType(b)) => a == b,
            (Value::Scope(a), Value::Scope(b)) => std::sync::Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
