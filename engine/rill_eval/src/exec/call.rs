//! Closure creation and the call protocol.
//!
//! A `Function` expression evaluates to a closure without running its
//! body. Invocation binds arguments to declared parameters — positional
//! binding through the flattening walker, spread collection, named
//! arguments, defaults evaluated against the defining scope — and then
//! evaluates the body in the new scope. A `Returning` exit is caught at
//! the call boundary of a bound function and becomes the call's result.

use rill_ir::{CallArg, CallArgRange, ExprId, ExprKind, Name, Param, ParamRange, Span};
use rill_runtime::{
    flatten_positional, no_value_specified, not_callable, not_enough_parameters,
    parameter_undefined, spread_elements, spread_not_last, too_many_parameters, Control,
    DefaultScope, ExecResult, FunctionValue, Mutability, NativeFn, ParamScope, ScopeHandle, Value,
};
use rustc_hash::FxHashMap;

use crate::diagnostics::CallFrame;
use crate::host::{dispatch_member_call, DispatchOutcome, DispatchTarget};
use crate::interpreter::Interpreter;

impl<'a> Interpreter<'a> {
    /// Evaluate a `Function` expression into a closure capturing the
    /// current scope. The body does not run.
    pub(crate) fn eval_function(
        &mut self,
        params: ParamRange,
        body: ExprId,
        sub_scope: bool,
        span: Span,
    ) -> ExecResult {
        let list = self.arena.params(params);
        let last = list.len().saturating_sub(1);
        // A spread parameter is only legal in last position.
        if list.iter().enumerate().any(|(i, p)| p.spread && i != last) {
            return Err(self.error(spread_not_last(), span));
        }
        Ok(Value::Function(FunctionValue::new(
            self.arena.clone(),
            params,
            body,
            sub_scope,
            self.env.clone(),
        )))
    }

    /// Evaluate a call expression.
    ///
    /// A call through a member projection dispatches against the host
    /// object (or host type, for statics) rather than reading the member
    /// as a value first.
    pub(crate) fn eval_apply(
        &mut self,
        callee: ExprId,
        args: CallArgRange,
        span: Span,
    ) -> ExecResult {
        let callee_expr = *self.arena.expr(callee);
        if let ExprKind::Member { object, member } = callee_expr.kind {
            let target = self.eval(object)?.single();
            match target {
                Value::HostObject(host) => {
                    let (positional, named) = self.eval_args(args)?;
                    self.reject_named_for_host(&named, span)?;
                    return self.host_call(HostCallee::Instance(host), member, positional, span);
                }
                Value::HostType(ty) => {
                    let (positional, named) = self.eval_args(args)?;
                    self.reject_named_for_host(&named, span)?;
                    return self.host_call(HostCallee::Static(ty), member, positional, span);
                }
                Value::Scope(scope) => {
                    let callee_val = match rill_runtime::resolve_chain(&scope, member) {
                        Some(reference) => {
                            reference.get().map_err(|e| self.error(e, callee_expr.span))?
                        }
                        None => {
                            return Err(self.error(
                                rill_runtime::undefined_member(
                                    "scope",
                                    self.interner.lookup(member),
                                ),
                                callee_expr.span,
                            ))
                        }
                    };
                    let (positional, named) = self.eval_args(args)?;
                    return self.call_value(callee_val, positional, named, span);
                }
                other => {
                    return Err(self.error(
                        rill_runtime::type_mismatch("object or scope", other.type_name()),
                        callee_expr.span,
                    ))
                }
            }
        }

        let callee_val = self.eval(callee)?.single();
        let (positional, named) = self.eval_args(args)?;
        self.call_value(callee_val, positional, named, span)
    }

    /// Evaluate call arguments left to right into the positional walker
    /// output and the named map input.
    fn eval_args(
        &mut self,
        args: CallArgRange,
    ) -> Result<(Vec<Value>, Vec<(Name, Value)>), Control> {
        let count = args.len as usize;
        let mut positional = Vec::with_capacity(count);
        let mut named = Vec::new();
        for i in 0..count {
            let arg: CallArg = self.arena.args(args)[i];
            let value = self.eval(arg.value)?;
            if arg.spread {
                // An explicit spread must be a tuple; its elements fill
                // one slot each, without the single-element degeneration.
                let arg_span = self.arena.expr(arg.value).span;
                let elements =
                    spread_elements(value).map_err(|e| self.error(e, arg_span))?;
                positional.extend(elements);
            } else if arg.is_named() {
                named.push((arg.name, value));
            } else {
                positional.extend(flatten_positional(vec![value]));
            }
        }
        Ok((positional, named))
    }

    /// Apply a callee value to already-evaluated arguments.
    pub(crate) fn call_value(
        &mut self,
        callee: Value,
        positional: Vec<Value>,
        named: Vec<(Name, Value)>,
        span: Span,
    ) -> ExecResult {
        match callee {
            Value::Function(func) => self.call_function(&func, positional, named, span),
            Value::Native(f, name) => self.call_native(f, name, positional, named, span),
            Value::HostType(ty) => {
                // Applying a host type constructs: dispatch its `new`.
                self.reject_named_for_host(&named, span)?;
                let ctor = self.interner.intern("new");
                self.host_call(HostCallee::Static(ty), ctor, positional, span)
            }
            other => Err(self.error(not_callable(other.type_name()), span)),
        }
    }

    /// Invoke a closure.
    pub(crate) fn call_function(
        &mut self,
        func: &FunctionValue,
        positional: Vec<Value>,
        named: Vec<(Name, Value)>,
        span: Span,
    ) -> ExecResult {
        // Clone-per-child: the callee frame exists only on the child's
        // stack, so the parent's is restored by construction.
        let mut calls = self.calls.clone();
        calls
            .push(CallFrame {
                name: func.name(),
                call_span: Some(span),
            })
            .map_err(|e| self.error(e, span))?;

        // Block bodies get a full child scope with parameters as mutable
        // locals; expression bodies get the lighter parameter-only layer.
        let call_scope: ScopeHandle = if func.sub_scope() {
            DefaultScope::child_of(func.captured())
        } else {
            ParamScope::over(func.captured(), std::iter::empty())
        };

        let mut child = Interpreter {
            engine: self.engine,
            interner: self.interner,
            arena: func.arena().clone(),
            env: call_scope,
            calls,
        };
        child.bind_params(func, positional, named, span)?;
        match child.eval(func.body()) {
            // The bound-function boundary is where `return` lands.
            Err(Control::Return(value)) if func.is_bound() => Ok(value),
            other => other,
        }
    }

    /// Bind arguments to declared parameters in the (already current)
    /// call scope. Defaults evaluate here, against the defining chain —
    /// never the caller's.
    fn bind_params(
        &mut self,
        func: &FunctionValue,
        positional: Vec<Value>,
        named: Vec<(Name, Value)>,
        call_span: Span,
    ) -> Result<(), Control> {
        let params: Vec<Param> = func.params().to_vec();
        let function_name = if func.name().is_empty() {
            "<function>"
        } else {
            self.interner.lookup(func.name())
        };
        let has_named = !named.is_empty();
        let mut named_map: FxHashMap<Name, Value> = FxHashMap::default();
        for (name, value) in named {
            if named_map.insert(name, value).is_some() {
                return Err(self.error(
                    parameter_undefined(self.interner.lookup(name)),
                    call_span,
                ));
            }
        }
        // An unmatched supplied name fails before any binding happens.
        for &name in named_map.keys() {
            if !params.iter().any(|p| p.name == name) {
                return Err(self.error(
                    parameter_undefined(self.interner.lookup(name)),
                    call_span,
                ));
            }
        }

        let rest_param = params.last().copied().filter(|p| p.spread);
        let fixed_count = params.len() - usize::from(rest_param.is_some());
        let mut positional = positional.into_iter();

        for param in &params[..fixed_count] {
            let value = if let Some(value) = positional.next() {
                if named_map.contains_key(&param.name) {
                    return Err(self.error(
                        parameter_undefined(self.interner.lookup(param.name)),
                        call_span,
                    ));
                }
                value
            } else if let Some(value) = named_map.remove(&param.name) {
                value
            } else if param.default.is_valid() {
                self.eval(param.default)?
            } else if has_named {
                return Err(self.error(
                    no_value_specified(self.interner.lookup(param.name)),
                    call_span,
                ));
            } else {
                return Err(self.error(not_enough_parameters(function_name), call_span));
            };
            self.env
                .declare(param.name, value, Mutability::Mutable)
                .map_err(|e| self.error(e, call_span))?;
        }

        if let Some(rest) = rest_param {
            if named_map.remove(&rest.name).is_some() {
                return Err(self.error(
                    parameter_undefined(self.interner.lookup(rest.name)),
                    call_span,
                ));
            }
            // The rest parameter collects the remaining walker output.
            let rest_values: Vec<Value> = positional.collect();
            self.env
                .declare(rest.name, Value::tuple(rest_values), Mutability::Mutable)
                .map_err(|e| self.error(e, call_span))?;
        } else if positional.next().is_some() {
            return Err(self.error(too_many_parameters(function_name), call_span));
        }

        if let Some(&name) = named_map.keys().next() {
            return Err(self.error(
                parameter_undefined(self.interner.lookup(name)),
                call_span,
            ));
        }
        Ok(())
    }

    /// Invoke a built-in.
    fn call_native(
        &mut self,
        f: NativeFn,
        name: &'static str,
        positional: Vec<Value>,
        named: Vec<(Name, Value)>,
        span: Span,
    ) -> ExecResult {
        if let Some((arg_name, _)) = named.first() {
            return Err(self.error(
                parameter_undefined(self.interner.lookup(*arg_name)),
                span,
            ));
        }
        let frame = CallFrame {
            name: self.interner.intern(name),
            call_span: Some(span),
        };
        self.calls.push(frame).map_err(|e| self.error(e, span))?;
        let result = f(&positional).map_err(|e| self.error(e, span));
        self.calls.pop();
        result
    }

    /// Dispatch a member call against a host object or host type.
    fn host_call(
        &mut self,
        callee: HostCallee,
        member: Name,
        args: Vec<Value>,
        span: Span,
    ) -> ExecResult {
        let frame = CallFrame {
            name: member,
            call_span: Some(span),
        };
        self.calls.push(frame).map_err(|e| self.error(e, span))?;
        let target = match &callee {
            HostCallee::Instance(host) => DispatchTarget::Instance(host),
            HostCallee::Static(ty) => DispatchTarget::Static(*ty),
        };
        let outcome = dispatch_member_call(
            self.engine.interop().as_ref(),
            self.engine.resolutions(),
            self.interner,
            target,
            member,
            &args,
        );
        let result = match outcome {
            Ok(DispatchOutcome::Invoked(value)) => Ok(value),
            Ok(DispatchOutcome::FieldValue(value)) => {
                // A callable field value is applied like any function.
                self.calls.pop();
                return self.call_value(value, args, Vec::new(), span);
            }
            Err(err) => Err(self.error(err, span)),
        };
        self.calls.pop();
        result
    }

    fn reject_named_for_host(
        &self,
        named: &[(Name, Value)],
        span: Span,
    ) -> Result<(), Control> {
        if let Some((name, _)) = named.first() {
            return Err(self.error(
                parameter_undefined(self.interner.lookup(*name)),
                span,
            ));
        }
        Ok(())
    }
}

/// Owned dispatch target, so the borrow of the evaluated receiver does
/// not outlive argument evaluation.
enum HostCallee {
    Instance(rill_runtime::HostObject),
    Static(rill_runtime::HostTypeId),
}
