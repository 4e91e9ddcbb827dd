//! Built-in functions and the stock global scope.
//!
//! The global scope is a single table constructed once at engine startup
//! and immutable afterwards; script code can never insert into it. These
//! are the stock conversions every embedding gets; embedders extend the
//! table through `GlobalScopeBuilder` before freezing.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use rill_ir::StringInterner;
use rill_runtime::{type_mismatch, EvalError, GlobalScope, Value};

/// Build the stock global scope: `text`, `number`, `size`, `kind`.
pub fn standard_globals(interner: &StringInterner) -> Arc<GlobalScope> {
    GlobalScope::builder()
        .define(interner.intern("text"), Value::Native(native_text, "text"))
        .define(
            interner.intern("number"),
            Value::Native(native_number, "number"),
        )
        .define(interner.intern("size"), Value::Native(native_size, "size"))
        .define(interner.intern("kind"), Value::Native(native_kind, "kind"))
        .build()
}

fn expect_one(args: &[Value], name: &str) -> Result<(), EvalError> {
    if args.len() == 1 {
        Ok(())
    } else {
        Err(EvalError::new(format!(
            "{name} expects 1 argument, got {}",
            args.len()
        )))
    }
}

/// Convert a value to its textual form.
fn native_text(args: &[Value]) -> Result<Value, EvalError> {
    expect_one(args, "text")?;
    Ok(Value::string(args[0].to_string()))
}

/// Convert a value to a number.
fn native_number(args: &[Value]) -> Result<Value, EvalError> {
    expect_one(args, "number")?;
    match &args[0] {
        Value::Number(n) => Ok(Value::decimal(*n)),
        Value::Bool(b) => Ok(Value::number(i64::from(*b))),
        value if value.is_string() => {
            let text = value.as_str().unwrap_or("");
            Decimal::from_str(text.trim())
                .map(Value::decimal)
                .map_err(|_| EvalError::new(format!("cannot parse '{text}' as number")))
        }
        other => Err(type_mismatch("number or string", other.type_name())),
    }
}

/// Element count of a tuple, or character count of a string.
fn native_size(args: &[Value]) -> Result<Value, EvalError> {
    expect_one(args, "size")?;
    match &args[0] {
        Value::Tuple(items) => Ok(Value::number(items.len() as i64)),
        value if value.is_string() => {
            let chars = value.as_str().unwrap_or("").chars().count();
            Ok(Value::number(chars as i64))
        }
        other => Err(type_mismatch("tuple or string", other.type_name())),
    }
}

/// Script-visible type name of a value.
fn native_kind(args: &[Value]) -> Result<Value, EvalError> {
    expect_one(args, "kind")?;
    Ok(Value::string(args[0].type_name()))
}
