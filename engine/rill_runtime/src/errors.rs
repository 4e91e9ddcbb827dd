//! Error types and control-flow signals for evaluation.
//!
//! # Structured Error Categories
//!
//! [`EvalErrorKind`] provides typed categories; factory functions (e.g.
//! [`undefined_variable`]) are the construction API and populate both the
//! kind and the message.
//!
//! # Control Flow
//!
//! Non-local exits are values, not host exceptions: evaluation returns
//! `Result<Value, Control>` where [`Control`] is either the `Returning`
//! exit or a raised error. Scope restoration is ordinary RAII cleanup that
//! runs on every variant.

use std::fmt;

use rill_diagnostic::{Diagnostic, TrailLine};
use rill_ir::{BinaryOp, Span};

use crate::Value;

/// Result of a complete evaluation, as seen by embedders.
pub type EvalResult = Result<Value, EvalError>;

/// Result of evaluating one expression inside the tree walk.
pub type ExecResult = Result<Value, Control>;

/// Non-local exit propagating up the evaluation call chain.
#[derive(Clone, Debug)]
pub enum Control {
    /// `return` unwinding to the nearest bound call boundary.
    Return(Value),
    /// A raised error, unwinding to the host embedding.
    Raise(EvalError),
}

impl Control {
    /// Collapse at the outermost boundary: a stray `return` yields its
    /// value, an error stays an error.
    pub fn into_result(self) -> EvalResult {
        match self {
            Control::Return(value) => Ok(value),
            Control::Raise(err) => Err(err),
        }
    }
}

impl From<EvalError> for Control {
    fn from(err: EvalError) -> Self {
        Control::Raise(err)
    }
}

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Name resolution
    Undefined { name: String },
    UndefinedMember { type_name: String, member: String },

    // Call binding
    NotEnoughParameters { function: String },
    TooManyParameters { function: String },
    SpreadNotLast,
    ParameterUndefined { name: String },
    NoValueSpecified { name: String },
    NotCallable { type_name: String },

    // Value shape
    TypeMismatch { expected: String, got: String },
    TupleArityMismatch { expected: usize, got: usize },
    TupleToScalar,
    AssignToConstant { name: String },
    DeclareUnsupported { scope: String },
    InvalidAssignmentTarget,

    // Arithmetic
    InvalidBinaryOp { op: BinaryOp, left: String, right: String },
    DivisionByZero,
    NumericOverflow { op: String },

    // Script-level throw (payload on the error itself)
    Thrown,

    // Host interop
    NoApplicableCandidate {
        type_name: String,
        member: String,
        arg_types: String,
    },
    HostCallFailed {
        type_name: String,
        member: String,
        detail: String,
    },

    // Modules
    CircularModule { name: String },

    // Resources
    RecursionLimit { depth: usize },

    /// Catch-all for errors not yet categorized.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined { name } => write!(f, "undefined: {name}"),
            Self::UndefinedMember { type_name, member } => {
                write!(f, "member not found: {member} on {type_name}")
            }
            Self::NotEnoughParameters { function } => {
                write!(f, "not enough parameters for {function}")
            }
            Self::TooManyParameters { function } => {
                write!(f, "too many parameters for {function}")
            }
            Self::SpreadNotLast => write!(f, "spread parameter must be last"),
            Self::ParameterUndefined { name } => write!(f, "parameter undefined: {name}"),
            Self::NoValueSpecified { name } => {
                write!(f, "no value specified for parameter: {name}")
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            Self::TupleArityMismatch { expected, got } => {
                write!(f, "tuple assignment expects {expected} values, got {got}")
            }
            Self::TupleToScalar => write!(f, "cannot assign a tuple to a single target"),
            Self::AssignToConstant { name } => {
                write!(f, "cannot assign to read-only binding: {name}")
            }
            Self::DeclareUnsupported { scope } => {
                write!(f, "cannot declare a variable in {scope}")
            }
            Self::InvalidAssignmentTarget => write!(f, "invalid assignment target"),
            Self::InvalidBinaryOp { op, left, right } => {
                write!(f, "operator {op} not defined for {left} and {right}")
            }
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::NumericOverflow { op } => write!(f, "numeric overflow in {op}"),
            Self::Thrown => write!(f, "uncaught script throw"),
            Self::NoApplicableCandidate {
                type_name,
                member,
                arg_types,
            } => write!(
                f,
                "no applicable candidate for {type_name}.{member}({arg_types})"
            ),
            Self::HostCallFailed {
                type_name,
                member,
                detail,
            } => write!(f, "host call {type_name}.{member} failed: {detail}"),
            Self::CircularModule { name } => {
                write!(f, "circular module dependency: {name}")
            }
            Self::RecursionLimit { depth } => {
                write!(f, "call depth limit exceeded ({depth})")
            }
            Self::Custom { message } => f.write_str(message),
        }
    }
}

/// A single frame of a captured call trail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    /// Function or member name.
    pub name: String,
    /// Source location of the call site.
    pub span: Option<Span>,
}

/// Immutable snapshot of the call stack at an error site.
///
/// Captured once at the raise point; unwinding never mutates it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    /// Create a backtrace from frames, innermost call first.
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Runtime error raised during evaluation.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured category.
    pub kind: EvalErrorKind,
    /// Human-readable message (equals `kind.to_string()` for factory-made
    /// errors).
    pub message: String,
    /// Source location of the expression that raised.
    pub span: Option<Span>,
    /// Payload of a script-level `throw`.
    pub payload: Option<Value>,
    /// Call trail captured at the raise point.
    pub backtrace: Option<EvalBacktrace>,
}

impl EvalError {
    /// Create an uncategorized error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
            payload: None,
            backtrace: None,
        }
    }

    /// Create an error from a typed kind.
    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            payload: None,
            backtrace: None,
        }
    }

    /// Attach a source span if none is present yet.
    ///
    /// The first (innermost) attribution wins; rethrows never overwrite it.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Attach a backtrace if none is present yet.
    ///
    /// The snapshot is taken once at the raise point and is immutable as
    /// the error continues to unwind.
    #[must_use]
    pub fn or_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    /// Attach a thrown payload value.
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Convert to a presentable diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.message.clone());
        if let Some(span) = self.span {
            diag = diag.with_span(span);
        }
        if let Some(backtrace) = &self.backtrace {
            diag = diag.with_trail(
                backtrace
                    .frames()
                    .iter()
                    .map(|frame| TrailLine {
                        name: frame.name.clone(),
                        span: frame.span,
                    })
                    .collect(),
            );
        }
        diag
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory functions

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Undefined {
        name: name.to_owned(),
    })
}

pub fn undefined_member(type_name: &str, member: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedMember {
        type_name: type_name.to_owned(),
        member: member.to_owned(),
    })
}

pub fn not_enough_parameters(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotEnoughParameters {
        function: function.to_owned(),
    })
}

pub fn too_many_parameters(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyParameters {
        function: function.to_owned(),
    })
}

pub fn spread_not_last() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SpreadNotLast)
}

pub fn parameter_undefined(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParameterUndefined {
        name: name.to_owned(),
    })
}

pub fn no_value_specified(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoValueSpecified {
        name: name.to_owned(),
    })
}

pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_owned(),
    })
}

pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_owned(),
        got: got.to_owned(),
    })
}

pub fn tuple_arity_mismatch(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TupleArityMismatch { expected, got })
}

pub fn tuple_to_scalar() -> EvalError {
    EvalError::from_kind(EvalErrorKind::TupleToScalar)
}

pub fn assign_to_constant(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssignToConstant {
        name: name.to_owned(),
    })
}

pub fn declare_unsupported(scope: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DeclareUnsupported {
        scope: scope.to_owned(),
    })
}

pub fn invalid_assignment_target() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidAssignmentTarget)
}

pub fn invalid_binary_op(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp {
        op,
        left: left.to_owned(),
        right: right.to_owned(),
    })
}

pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

pub fn numeric_overflow(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NumericOverflow { op: op.to_owned() })
}

pub fn thrown_value(payload: Value) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Thrown).with_payload(payload)
}

pub fn no_applicable_candidate(type_name: &str, member: &str, arg_types: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoApplicableCandidate {
        type_name: type_name.to_owned(),
        member: member.to_owned(),
        arg_types: arg_types.to_owned(),
    })
}

pub fn host_call_failed(type_name: &str, member: &str, detail: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::HostCallFailed {
        type_name: type_name.to_owned(),
        member: member.to_owned(),
        detail: detail.to_owned(),
    })
}

pub fn circular_module(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CircularModule {
        name: name.to_owned(),
    })
}

pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RecursionLimit { depth })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_message_matches_kind() {
        let err = undefined_variable("x");
        assert_eq!(err.message, "undefined: x");
        assert_eq!(
            err.kind,
            EvalErrorKind::Undefined {
                name: "x".to_owned()
            }
        );
    }

    #[test]
    fn or_span_keeps_first_attribution() {
        let err = division_by_zero()
            .or_span(Span::new(1, 2))
            .or_span(Span::new(9, 10));
        assert_eq!(err.span, Some(Span::new(1, 2)));
    }

    #[test]
    fn or_backtrace_is_write_once() {
        let first = EvalBacktrace::new(vec![BacktraceFrame {
            name: "f".to_owned(),
            span: None,
        }]);
        let second = EvalBacktrace::new(vec![]);
        let err = division_by_zero()
            .or_backtrace(first.clone())
            .or_backtrace(second);
        assert_eq!(err.backtrace, Some(first));
    }

    #[test]
    fn thrown_carries_payload() {
        let err = thrown_value(Value::string("boom"));
        assert_eq!(err.kind, EvalErrorKind::Thrown);
        assert_eq!(err.payload, Some(Value::string("boom")));
    }

    #[test]
    fn control_into_result() {
        let value = Control::Return(Value::number(1)).into_result();
        assert!(value.is_ok());
        let err = Control::Raise(division_by_zero()).into_result();
        assert!(err.is_err());
    }

    #[test]
    fn to_diagnostic_carries_trail() {
        let err = undefined_variable("y").or_backtrace(EvalBacktrace::new(vec![BacktraceFrame {
            name: "outer".to_owned(),
            span: Some(Span::new(3, 4)),
        }]));
        let diag = err.to_diagnostic();
        assert_eq!(diag.trail.len(), 1);
        assert_eq!(diag.trail[0].name, "outer");
    }
}
