//! Arena allocation for expressions.
//!
//! All AST nodes live in flat `Vec`s owned by the [`ExprArena`]; children
//! are referenced by `u32` ids and typed ranges, never boxed. The arena is
//! append-only while the parser builds it and read-only afterwards.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::ast::{CallArg, CallArgRange, Expr, ExprKind, Param, ParamRange, TemplatePart,
    TemplatePartRange};
use crate::Span;

/// Index of an expression in an [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Sentinel for "no expression" (absent else-branch, bare return, ...).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        ExprId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Whether this id refers to an actual expression.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId(INVALID)")
        }
    }
}

/// Range of expression ids in the arena's expression-list table.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// Arena holding every node of one parsed source unit.
#[derive(Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    /// Side table for expression lists (block bodies, tuple elements).
    expr_lists: Vec<ExprId>,
    params: Vec<Param>,
    args: Vec<CallArg>,
    parts: Vec<TemplatePart>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an expression node.
    pub fn push_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let id = u32::try_from(self.exprs.len()).unwrap_or(u32::MAX);
        self.exprs.push(Expr::new(kind, span));
        ExprId::new(id)
    }

    /// Allocate a list of expression ids, returning its range.
    pub fn push_expr_list(&mut self, ids: &[ExprId]) -> ExprRange {
        let start = u32::try_from(self.expr_lists.len()).unwrap_or(u32::MAX);
        self.expr_lists.extend_from_slice(ids);
        ExprRange {
            start,
            len: u32::try_from(ids.len()).unwrap_or(u32::MAX),
        }
    }

    /// Allocate a parameter list, returning its range.
    pub fn push_params(&mut self, params: &[Param]) -> ParamRange {
        let start = u32::try_from(self.params.len()).unwrap_or(u32::MAX);
        self.params.extend_from_slice(params);
        ParamRange {
            start,
            len: u32::try_from(params.len()).unwrap_or(u32::MAX),
        }
    }

    /// Allocate a call-argument list, returning its range.
    pub fn push_args(&mut self, args: &[CallArg]) -> CallArgRange {
        let start = u32::try_from(self.args.len()).unwrap_or(u32::MAX);
        self.args.extend_from_slice(args);
        CallArgRange {
            start,
            len: u32::try_from(args.len()).unwrap_or(u32::MAX),
        }
    }

    /// Allocate interpolation parts, returning their range.
    pub fn push_parts(&mut self, parts: &[TemplatePart]) -> TemplatePartRange {
        let start = u32::try_from(self.parts.len()).unwrap_or(u32::MAX);
        self.parts.extend_from_slice(parts);
        TemplatePartRange {
            start,
            len: u32::try_from(parts.len()).unwrap_or(u32::MAX),
        }
    }

    /// Get an expression by id.
    ///
    /// # Panics
    /// Panics if `id` is invalid or from another arena; ids are only ever
    /// produced by this arena's `push_expr`.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.raw() as usize]
    }

    /// Resolve an expression-list range to a slice of ids.
    #[inline]
    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start as usize..(range.start + range.len) as usize]
    }

    /// Resolve a parameter range.
    #[inline]
    pub fn params(&self, range: ParamRange) -> &[Param] {
        &self.params[range.start as usize..(range.start + range.len) as usize]
    }

    /// Resolve a call-argument range.
    #[inline]
    pub fn args(&self, range: CallArgRange) -> &[CallArg] {
        &self.args[range.start as usize..(range.start + range.len) as usize]
    }

    /// Resolve an interpolation-part range.
    #[inline]
    pub fn parts(&self, range: TemplatePartRange) -> &[TemplatePart] {
        &self.parts[range.start as usize..(range.start + range.len) as usize]
    }

    /// Number of expressions allocated.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

impl fmt::Debug for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprArena")
            .field("exprs", &self.exprs.len())
            .field("params", &self.params.len())
            .field("args", &self.args.len())
            .finish_non_exhaustive()
    }
}

/// Shared, immutable handle to a finished arena.
///
/// The tree is constructed once by the parser and never mutated, so it is
/// safe to share across repeated evaluations and across threads.
#[derive(Clone, Debug)]
pub struct SharedArena(Arc<ExprArena>);

impl SharedArena {
    pub fn new(arena: ExprArena) -> Self {
        SharedArena(Arc::new(arena))
    }
}

impl Deref for SharedArena {
    type Target = ExprArena;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
