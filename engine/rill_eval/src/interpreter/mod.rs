//! Tree-walking interpreter.
//!
//! One [`Interpreter`] is the execution context of one logical call
//! thread: the current scope (swapped, not pushed, with unconditional
//! restoration through [`ScopedEnv`]) and the diagnostic call stack.
//! Shared, process-level state (globals, host provider, resolution cache,
//! module registry) lives on the [`Engine`](crate::Engine).
//!
//! # Arena threading
//!
//! Closures carry their own `SharedArena`; a function call evaluates the
//! body against the callee's arena, not the caller's, so expression ids
//! never cross arenas.

mod env_guard;


use std::sync::Arc;

use rill_ir::{
    BinaryOp, ExprId, ExprKind, ExprRange, Name, Span, SharedArena, StringInterner,
    TemplatePartRange, UnaryOp,
};
use rill_runtime::{
    resolve_chain, type_mismatch, undefined_member, undefined_variable, Control, EvalError,
    ExecResult, InterpPart, InterpString, Reference, ScopeHandle, Value,
};

use crate::diagnostics::CallStack;
use crate::engine::Engine;
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::stack::ensure_sufficient_stack;

pub(crate) use env_guard::ScopedEnv;

/// Per-invocation execution context.
pub(crate) struct Interpreter<'a> {
    pub(crate) engine: &'a Engine,
    pub(crate) interner: &'a StringInterner,
    pub(crate) arena: SharedArena,
    /// Current scope; swapped on entry/exit, restored unconditionally.
    pub(crate) env: ScopeHandle,
    /// Diagnostic call-site stack; never used for control flow.
    pub(crate) calls: CallStack,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        interner: &'a StringInterner,
        arena: SharedArena,
        env: ScopeHandle,
    ) -> Self {
        Interpreter {
            engine,
            interner,
            arena,
            env,
            calls: CallStack::new(engine.max_depth()),
        }
    }

    /// Evaluate one expression.
    pub(crate) fn eval(&mut self, id: ExprId) -> ExecResult {
        ensure_sufficient_stack(|| self.eval_expr(id))
    }

    fn eval_expr(&mut self, id: ExprId) -> ExecResult {
        let expr = *self.arena.expr(id);
        let span = expr.span;
        match expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(b)),
            ExprKind::Number(d) => Ok(Value::decimal(d)),
            ExprKind::Str(name) => Ok(Value::string(self.interner.lookup(name))),
            ExprKind::Ident(name) => self.eval_ident(name, span),
            ExprKind::Interp { head, parts } => self.eval_interp(head, parts),
            ExprKind::Binary { op, left, right } => {
                self.eval_binary_expr(op, left, right, span)
            }
            ExprKind::Unary { op, operand } => self.eval_unary_expr(op, operand, span),
            ExprKind::Assign { target, value } => self.eval_assign(target, value, span),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.eval_if(cond, then_branch, else_branch),
            ExprKind::While { cond, body } => self.eval_while(cond, body),
            ExprKind::Block { exprs } => self.eval_block(exprs),
            ExprKind::TupleBuild { elements } => self.eval_tuple(elements),
            ExprKind::Function {
                params,
                body,
                sub_scope,
            } => self.eval_function(params, body, sub_scope, span),
            ExprKind::Apply { callee, args } => self.eval_apply(callee, args, span),
            ExprKind::Member { object, member } => self.eval_member(object, member, span),
            ExprKind::Var { name, init } => self.eval_declare(name, init, true, span),
            ExprKind::Val { name, init } => self.eval_declare(name, init, false, span),
            ExprKind::With { object, body } => self.eval_with(object, body, span),
            ExprKind::Module { name, body } => self.eval_module(name, body, span),
            ExprKind::Return { operand } => self.eval_return(operand),
            ExprKind::Throw { operand } => self.eval_throw(operand, span),
        }
    }

    /// Raise an error: attribute the span and snapshot the call stack,
    /// unless the error already carries them (rethrows keep the original
    /// attribution).
    pub(crate) fn error(&self, err: EvalError, span: Span) -> Control {
        Control::Raise(
            err.or_span(span)
                .or_backtrace(self.calls.capture(self.interner)),
        )
    }

    /// Resolve a name: the scope chain first, then — once, at the root —
    /// the global built-ins.
    pub(crate) fn resolve(&self, name: Name) -> Option<Reference> {
        resolve_chain(&self.env, name).or_else(|| self.engine.globals().get(name))
    }

    fn eval_ident(&mut self, name: Name, span: Span) -> ExecResult {
        match self.resolve(name) {
            Some(reference) => reference.get().map_err(|e| self.error(e, span)),
            None => Err(self.error(undefined_variable(self.interner.lookup(name)), span)),
        }
    }

    fn eval_interp(&mut self, head: Name, parts: TemplatePartRange) -> ExecResult {
        let mut fragments = Vec::new();
        let head_text = self.interner.lookup(head);
        if !head_text.is_empty() {
            fragments.push(InterpPart::Text(Arc::from(head_text)));
        }
        let count = parts.len as usize;
        for i in 0..count {
            let part = self.arena.parts(parts)[i];
            let value = self.eval(part.expr)?;
            fragments.push(InterpPart::Value(value));
            let text = self.interner.lookup(part.text_after);
            if !text.is_empty() {
                fragments.push(InterpPart::Text(Arc::from(text)));
            }
        }
        Ok(Value::interp(InterpString::new(fragments)))
    }

    fn eval_binary_expr(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: Span,
    ) -> ExecResult {
        match op {
            BinaryOp::And => {
                if !self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right_val = self.eval(right)?;
                Ok(Value::Bool(right_val.is_truthy()))
            }
            BinaryOp::Or => {
                if self.eval(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let right_val = self.eval(right)?;
                Ok(Value::Bool(right_val.is_truthy()))
            }
            _ => {
                let left_val = self.eval(left)?.single();
                let right_val = self.eval(right)?.single();
                evaluate_binary(op, &left_val, &right_val).map_err(|e| self.error(e, span))
            }
        }
    }

    fn eval_unary_expr(&mut self, op: UnaryOp, operand: ExprId, span: Span) -> ExecResult {
        let value = self.eval(operand)?.single();
        evaluate_unary(op, &value).map_err(|e| self.error(e, span))
    }

    /// Evaluate a sequence, yielding the last value (null when empty).
    pub(crate) fn eval_exprs(&mut self, exprs: ExprRange) -> ExecResult {
        let count = exprs.len as usize;
        let mut result = Value::Null;
        for i in 0..count {
            let id = self.arena.expr_list(exprs)[i];
            result = self.eval(id)?;
        }
        Ok(result)
    }

    fn eval_tuple(&mut self, elements: ExprRange) -> ExecResult {
        let count = elements.len as usize;
        let mut values = Vec::with_capacity(count);
        for i in 0..count {
            let id = self.arena.expr_list(elements)[i];
            values.push(self.eval(id)?);
        }
        Ok(Value::tuple(values))
    }

    /// Member read: project out of a scope value, or a host object's field
    /// through the interop layer.
    fn eval_member(&mut self, object: ExprId, member: Name, span: Span) -> ExecResult {
        let target = self.eval(object)?.single();
        match target {
            Value::Scope(scope) => match resolve_chain(&scope, member) {
                Some(reference) => reference.get().map_err(|e| self.error(e, span)),
                None => Err(self.error(
                    undefined_member("scope", self.interner.lookup(member)),
                    span,
                )),
            },
            Value::HostObject(object) => self
                .engine
                .interop()
                .get_member(&object, member)
                .map_err(|e| self.error(e, span)),
            other => Err(self.error(
                type_mismatch("object or scope", other.type_name()),
                span,
            )),
        }
    }
}
