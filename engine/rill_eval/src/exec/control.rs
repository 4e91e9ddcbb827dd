//! Control flow and binding forms.
//!
//! Conditionals, loops, blocks, `with`/module layering, declarations,
//! assignment (including tuple-pattern targets), and the `throw`/`return`
//! exits. Every form that swaps a scope in restores the previous one
//! unconditionally through the [`ScopedEnv`] guard.
//!
//! [`ScopedEnv`]: crate::interpreter::ScopedEnv

use rill_ir::{ExprId, ExprKind, ExprRange, Name, Span};
use rill_runtime::{
    assign_to_constant, invalid_assignment_target, resolve_chain, thrown_value,
    tuple_arity_mismatch, tuple_to_scalar, type_mismatch, undefined_variable, AssignError,
    CombinedScope, Control, DefaultScope, ExecResult, Mutability, ObjectScope, Reference,
    ScopeHandle, Value,
};

use crate::interpreter::Interpreter;

/// An assignment target, evaluated before the right-hand side.
enum Target {
    One { reference: Reference, name: Name },
    Tuple(Vec<Target>),
}

impl Interpreter<'_> {
    pub(crate) fn eval_if(
        &mut self,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    ) -> ExecResult {
        if self.eval(cond)?.is_truthy() {
            self.eval(then_branch)
        } else if else_branch.is_valid() {
            self.eval(else_branch)
        } else {
            Ok(Value::Null)
        }
    }

    /// Result is the last body evaluation (null for zero iterations).
    pub(crate) fn eval_while(&mut self, cond: ExprId, body: ExprId) -> ExecResult {
        let mut result = Value::Null;
        while self.eval(cond)?.is_truthy() {
            result = self.eval(body)?;
        }
        Ok(result)
    }

    /// A block evaluates its sequence in a fresh child scope; the child is
    /// discarded on exit whether evaluation succeeds or raises.
    pub(crate) fn eval_block(&mut self, exprs: ExprRange) -> ExecResult {
        let child: ScopeHandle = DefaultScope::child_of(&self.env);
        let mut scoped = self.enter_scope(child);
        scoped.eval_exprs(exprs)
    }

    pub(crate) fn eval_declare(
        &mut self,
        name: Name,
        init: ExprId,
        mutable: bool,
        span: Span,
    ) -> ExecResult {
        let value = if init.is_valid() {
            self.eval(init)?
        } else {
            Value::Null
        };
        // Storing a closure under a name binds it: its own `return` then
        // unwinds to that call, not further up.
        let value = match value {
            Value::Function(func) => Value::Function(func.bind(name)),
            other => other,
        };
        let mutability = if mutable {
            Mutability::Mutable
        } else {
            Mutability::Immutable
        };
        self.env
            .declare(name, value.clone(), mutability)
            .map_err(|e| self.error(e, span))?;
        Ok(value)
    }

    /// `with` layers the object's members over the current scope for the
    /// duration of the body.
    pub(crate) fn eval_with(&mut self, object: ExprId, body: ExprId, span: Span) -> ExecResult {
        let target = self.eval(object)?.single();
        let layer: ScopeHandle = match target {
            // Already a scope: use it as-is.
            Value::Scope(scope) => scope,
            // Host object: member reads/writes through the interop layer.
            Value::HostObject(host) => ObjectScope::new(self.engine.interop().clone(), host),
            other => {
                return Err(self.error(
                    type_mismatch("object or scope", other.type_name()),
                    span,
                ))
            }
        };
        let combined: ScopeHandle = CombinedScope::layer(layer, self.env.clone());
        let mut scoped = self.enter_scope(combined);
        scoped.eval(body)
    }

    /// A module body runs once in a fresh root scope; the resulting scope
    /// is memoized engine-wide as the module's value.
    pub(crate) fn eval_module(&mut self, name: Name, body: ExprId, span: Span) -> ExecResult {
        let display = self.interner.lookup(name);
        match self.engine.modules().begin(name, display) {
            Err(err) => Err(self.error(err, span)),
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                let module_scope = DefaultScope::root();
                let handle: ScopeHandle = module_scope.clone();
                let body_kind = self.arena.expr(body).kind;
                let result = {
                    let mut scoped = self.enter_scope(handle.clone());
                    // A block body populates the module scope directly
                    // instead of a throwaway block child.
                    match body_kind {
                        ExprKind::Block { exprs } => scoped.eval_exprs(exprs),
                        _ => scoped.eval(body),
                    }
                };
                match result {
                    Ok(_) => {
                        let value = Value::Scope(handle);
                        self.engine.modules().finish(name, display, value.clone());
                        Ok(value)
                    }
                    Err(control) => {
                        self.engine.modules().abort(name);
                        Err(control)
                    }
                }
            }
        }
    }

    pub(crate) fn eval_return(&mut self, operand: ExprId) -> ExecResult {
        let value = if operand.is_valid() {
            self.eval(operand)?
        } else {
            Value::Null
        };
        Err(Control::Return(value))
    }

    pub(crate) fn eval_throw(&mut self, operand: ExprId, span: Span) -> ExecResult {
        let payload = self.eval(operand)?;
        Err(self.error(thrown_value(payload), span))
    }

    /// Assignment: the left side evaluates to a reference (or tuple of
    /// references), then the right side to a value, then the writes.
    pub(crate) fn eval_assign(&mut self, target: ExprId, value: ExprId, span: Span) -> ExecResult {
        let target = self.eval_target(target)?;
        let value = self.eval(value)?;
        self.assign_into(&target, value.clone(), span)?;
        Ok(value)
    }

    fn eval_target(&mut self, id: ExprId) -> Result<Target, Control> {
        let expr = *self.arena.expr(id);
        match expr.kind {
            ExprKind::Ident(name) => {
                let reference = self.resolve(name).ok_or_else(|| {
                    self.error(undefined_variable(self.interner.lookup(name)), expr.span)
                })?;
                Ok(Target::One { reference, name })
            }
            ExprKind::Member { object, member } => {
                let target = self.eval(object)?.single();
                let reference = match target {
                    Value::HostObject(host) => {
                        Reference::member(self.engine.interop().clone(), host, member)
                    }
                    Value::Scope(scope) => resolve_chain(&scope, member).ok_or_else(|| {
                        self.error(
                            undefined_variable(self.interner.lookup(member)),
                            expr.span,
                        )
                    })?,
                    other => {
                        return Err(self.error(
                            type_mismatch("object or scope", other.type_name()),
                            expr.span,
                        ))
                    }
                };
                Ok(Target::One {
                    reference,
                    name: member,
                })
            }
            ExprKind::TupleBuild { elements } => {
                let count = elements.len as usize;
                let mut targets = Vec::with_capacity(count);
                for i in 0..count {
                    let element = self.arena.expr_list(elements)[i];
                    targets.push(self.eval_target(element)?);
                }
                Ok(Target::Tuple(targets))
            }
            _ => Err(self.error(invalid_assignment_target(), expr.span)),
        }
    }

    fn assign_into(&mut self, target: &Target, value: Value, span: Span) -> Result<(), Control> {
        match target {
            Target::One { reference, name } => {
                let value = match value {
                    // A tuple does not collapse into a single slot.
                    Value::Tuple(_) => return Err(self.error(tuple_to_scalar(), span)),
                    // Assigning a closure binds it (see eval_declare).
                    Value::Function(func) => Value::Function(func.bind(*name)),
                    other => other,
                };
                reference
                    .set(value)
                    .map_err(|e| self.assign_error(e, *name, span))
            }
            Target::Tuple(targets) => {
                let Value::Tuple(items) = value else {
                    return Err(self.error(type_mismatch("tuple", value.type_name()), span));
                };
                // Positional, equal-arity match; never silent truncation.
                if items.len() != targets.len() {
                    return Err(self.error(tuple_arity_mismatch(targets.len(), items.len()), span));
                }
                for (target, item) in targets.iter().zip(items.iter()) {
                    self.assign_into(target, item.clone(), span)?;
                }
                Ok(())
            }
        }
    }

    fn assign_error(&self, err: AssignError, name: Name, span: Span) -> Control {
        match err {
            AssignError::ReadOnly => {
                self.error(assign_to_constant(self.interner.lookup(name)), span)
            }
            AssignError::Host(err) => self.error(err, span),
        }
    }
}
