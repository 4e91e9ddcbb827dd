//! Expression AST.
//!
//! Core expression nodes and variants. All children are indices into the
//! owning [`ExprArena`], not boxes; every kind is `Copy` and the whole tree
//! is immutable after parsing.
//!
//! [`ExprArena`]: crate::ExprArena

mod operators;

use std::fmt;

use rust_decimal::Decimal;

use crate::{ExprId, ExprRange, Name, Span};

pub use operators::{BinaryOp, UnaryOp};

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Range of [`Param`] entries in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ParamRange {
    pub start: u32,
    pub len: u32,
}

impl ParamRange {
    pub const EMPTY: ParamRange = ParamRange { start: 0, len: 0 };
}

/// Range of [`CallArg`] entries in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CallArgRange {
    pub start: u32,
    pub len: u32,
}

impl CallArgRange {
    pub const EMPTY: CallArgRange = CallArgRange { start: 0, len: 0 };
}

/// Range of [`TemplatePart`] entries in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TemplatePartRange {
    pub start: u32,
    pub len: u32,
}

/// A declared function parameter.
///
/// `spread` marks a rest-collecting parameter; it is only legal in last
/// position, which the evaluator checks when the function value is created.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    /// Default-value expression; `ExprId::INVALID` = no default.
    pub default: ExprId,
    pub spread: bool,
}

/// An argument at a call site.
///
/// `name` is `Name::EMPTY` for positional arguments. `spread` marks an
/// argument whose tuple value is expanded into positional slots.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallArg {
    pub name: Name,
    pub value: ExprId,
    pub spread: bool,
}

impl CallArg {
    /// Positional argument.
    pub fn positional(value: ExprId) -> Self {
        CallArg {
            name: Name::EMPTY,
            value,
            spread: false,
        }
    }

    /// Labeled argument.
    pub fn named(name: Name, value: ExprId) -> Self {
        CallArg {
            name,
            value,
            spread: false,
        }
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// A single interpolation segment in a string-interpolation literal.
///
/// Each part is `{expr}text_after`; the literal text before the first part
/// lives on the `Interp` node itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct TemplatePart {
    /// The interpolated expression.
    pub expr: ExprId,
    /// Literal text following this expression (interned; may be empty).
    pub text_after: Name,
}

/// Expression variants.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Null literal
    Null,

    /// Boolean literal: true, false
    Bool(bool),

    /// Decimal number literal
    Number(Decimal),

    /// String literal (interned)
    Str(Name),

    /// Variable reference
    Ident(Name),

    /// String interpolation: leading literal text plus `{expr}text` parts
    Interp {
        head: Name,
        parts: TemplatePartRange,
    },

    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },

    /// Unary operation: op operand
    Unary { op: UnaryOp, operand: ExprId },

    /// Assignment through a reference (or tuple of references)
    Assign { target: ExprId, value: ExprId },

    /// Conditional; `ExprId::INVALID` = no else branch
    If {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },

    /// Loop while the condition reduces true
    While { cond: ExprId, body: ExprId },

    /// Block: introduces a child scope; value is the last expression's
    Block { exprs: ExprRange },

    /// Tuple construction from element expressions
    TupleBuild { elements: ExprRange },

    /// Function literal. `sub_scope` = block body (parameters become
    /// mutable locals in a fresh child scope).
    Function {
        params: ParamRange,
        body: ExprId,
        sub_scope: bool,
    },

    /// Call: callee expression applied to arguments
    Apply { callee: ExprId, args: CallArgRange },

    /// Member read (or assignment target): object.member
    Member { object: ExprId, member: Name },

    /// Mutable declaration in the innermost scope
    Var { name: Name, init: ExprId },

    /// Read-only declaration in the innermost scope
    Val { name: Name, init: ExprId },

    /// Layer an object's members as a scope for the body
    With { object: ExprId, body: ExprId },

    /// Named module: body runs once, result memoized engine-wide
    Module { name: Name, body: ExprId },

    /// Non-local exit to the nearest bound call; `ExprId::INVALID` = bare
    Return { operand: ExprId },

    /// Raise a script-level exception carrying the operand value
    Throw { operand: ExprId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expr_kind_is_compact() {
        // ExprKind embeds a 16-byte Decimal; keep the node under 32 bytes.
        assert!(std::mem::size_of::<ExprKind>() <= 32);
    }

    #[test]
    fn call_arg_positional_is_unnamed() {
        let arg = CallArg::positional(ExprId::new(0));
        assert!(!arg.is_named());
        let named = CallArg::named(Name::from_raw(3), ExprId::new(0));
        assert!(named.is_named());
    }
}
