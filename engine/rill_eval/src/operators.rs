//! Binary and unary operator dispatch over values.
//!
//! All decimal arithmetic goes through the `checked_*` operations;
//! overflow and division by zero are errors, never panics. `and`/`or` are
//! short-circuited by the evaluator before reaching this module; the
//! fallback arms here evaluate both sides' truthiness.

use std::cmp::Ordering;

use rill_ir::{BinaryOp, UnaryOp};
use rill_runtime::{
    division_by_zero, invalid_binary_op, numeric_overflow, EvalError, Value,
};

/// Evaluate a binary operation on two values.
pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => eval_add(left, right),
        BinaryOp::Sub => eval_arith(op, left, right, "subtraction", |a, b| a.checked_sub(b)),
        BinaryOp::Mul => eval_arith(op, left, right, "multiplication", |a, b| a.checked_mul(b)),
        BinaryOp::Div => eval_div(op, left, right),
        BinaryOp::Mod => eval_rem(op, left, right),
        BinaryOp::Eq => Ok(Value::Bool(left == right)),
        BinaryOp::Ne => Ok(Value::Bool(left != right)),
        BinaryOp::Lt => compare(op, left, right, |ord| ord == Ordering::Less),
        BinaryOp::Le => compare(op, left, right, |ord| ord != Ordering::Greater),
        BinaryOp::Gt => compare(op, left, right, |ord| ord == Ordering::Greater),
        BinaryOp::Ge => compare(op, left, right, |ord| ord != Ordering::Less),
        // Short-circuit forms; reached only when both sides are already
        // evaluated (e.g. through the operator table in host calls).
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

/// Evaluate a unary operation.
pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::decimal(-*n)),
            other => Err(rill_runtime::type_mismatch("number", other.type_name())),
        },
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

/// `+` adds numbers and concatenates strings. A string on either side
/// concatenates the other side's textual form, which is what templates
/// expect from `"n=" + n`.
fn eval_add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .checked_add(*b)
            .map(Value::decimal)
            .ok_or_else(|| numeric_overflow("addition")),
        _ if left.is_string() || right.is_string() => {
            Ok(Value::string(format!("{left}{right}")))
        }
        _ => Err(invalid_binary_op(
            BinaryOp::Add,
            left.type_name(),
            right.type_name(),
        )),
    }
}

fn eval_arith(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    op_name: &str,
    f: impl Fn(rust_decimal::Decimal, rust_decimal::Decimal) -> Option<rust_decimal::Decimal>,
) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => f(*a, *b)
            .map(Value::decimal)
            .ok_or_else(|| numeric_overflow(op_name)),
        _ => Err(invalid_binary_op(op, left.type_name(), right.type_name())),
    }
}

fn eval_div(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                return Err(division_by_zero());
            }
            a.checked_div(*b)
                .map(Value::decimal)
                .ok_or_else(|| numeric_overflow("division"))
        }
        _ => Err(invalid_binary_op(op, left.type_name(), right.type_name())),
    }
}

fn eval_rem(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if b.is_zero() {
                return Err(division_by_zero());
            }
            a.checked_rem(*b)
                .map(Value::decimal)
                .ok_or_else(|| numeric_overflow("remainder"))
        }
        _ => Err(invalid_binary_op(op, left.type_name(), right.type_name())),
    }
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    accept: impl Fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.cmp(b),
        (a, b) if a.is_string() && b.is_string() => {
            match (a.as_str(), b.as_str()) {
                (Some(sa), Some(sb)) => sa.cmp(sb),
                _ => return Err(invalid_binary_op(op, a.type_name(), b.type_name())),
            }
        }
        _ => {
            return Err(invalid_binary_op(
                op,
                left.type_name(),
                right.type_name(),
            ))
        }
    };
    Ok(Value::Bool(accept(ordering)))
}
