//! Rill IR - Expression AST and supporting types for the rill engine.
//!
//! This crate contains the data structures shared by the (external) parser
//! and the evaluator:
//! - Spans for source locations
//! - Names for interned identifiers
//! - AST nodes (Expr, Param, CallArg, etc.)
//! - Arena allocation for expressions
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifier strings become `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId(u32)`
//!   indices or typed ranges into side tables
//!
//! The arena is built once by the parser and is read-only afterwards, so a
//! `SharedArena` can be handed to any number of evaluation threads.

mod arena;
pub mod ast;
mod interner;
mod name;
mod span;

pub use arena::{ExprArena, ExprId, ExprRange, SharedArena};
pub use ast::{
    BinaryOp, CallArg, CallArgRange, Expr, ExprKind, Param, ParamRange, TemplatePart,
    TemplatePartRange, UnaryOp,
};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use span::Span;
