//! Tuple flattening and reduction rules.
//!
//! Two operations live here, used throughout evaluation:
//!
//! - single-value reduction (`Value::single`): a tuple collapses to its
//!   last element when one value is required, recursively;
//! - the flattening argument walker: positional call arguments unwrap, so
//!   a tuple argument of size > 1 spreads across the remaining positional
//!   slots one element at a time, while a tuple of size 0 or 1 degenerates
//!   to nothing / its single element.

use crate::errors::{type_mismatch, EvalError};
use crate::Value;

/// Flatten positional argument values per the argument-walker rules.
pub fn flatten_positional(args: Vec<Value>) -> Vec<Value> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        push_unwrapped(&mut out, arg);
    }
    out
}

fn push_unwrapped(out: &mut Vec<Value>, value: Value) {
    match value {
        Value::Tuple(items) => match items.len() {
            0 => {}
            // A one-element tuple degenerates to its element, recursively.
            1 => push_unwrapped(out, items[0].clone()),
            // Larger tuples fill one slot per element; nested tuples stay
            // intact in their slot.
            _ => out.extend(items.iter().cloned()),
        },
        other => out.push(other),
    }
}

/// Elements of an explicit spread argument.
///
/// The operand must be a tuple; its elements feed the walker without the
/// single-element degeneration.
pub fn spread_elements(value: Value) -> Result<Vec<Value>, EvalError> {
    match value {
        Value::Tuple(items) => Ok(items.to_vec()),
        other => Err(type_mismatch("tuple", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nums(ns: &[i64]) -> Vec<Value> {
        ns.iter().map(|&n| Value::number(n)).collect()
    }

    #[test]
    fn plain_values_pass_through() {
        let out = flatten_positional(nums(&[1, 2]));
        assert_eq!(out, nums(&[1, 2]));
    }

    #[test]
    fn empty_tuple_contributes_nothing() {
        let out = flatten_positional(vec![Value::number(1), Value::unit(), Value::number(2)]);
        assert_eq!(out, nums(&[1, 2]));
    }

    #[test]
    fn single_element_tuple_degenerates() {
        let arg = Value::tuple(vec![Value::number(7)]);
        assert_eq!(flatten_positional(vec![arg]), nums(&[7]));
    }

    #[test]
    fn single_element_degenerates_recursively() {
        let arg = Value::tuple(vec![Value::tuple(vec![Value::number(7)])]);
        assert_eq!(flatten_positional(vec![arg]), nums(&[7]));
    }

    #[test]
    fn wide_tuple_spreads_one_element_per_slot() {
        let arg = Value::tuple(nums(&[1, 2, 3]));
        assert_eq!(flatten_positional(vec![arg]), nums(&[1, 2, 3]));
    }

    #[test]
    fn nested_tuple_in_wide_tuple_keeps_its_slot() {
        let inner = Value::tuple(nums(&[2, 3]));
        let arg = Value::tuple(vec![Value::number(1), inner.clone()]);
        let out = flatten_positional(vec![arg]);
        assert_eq!(out, vec![Value::number(1), inner]);
    }

    #[test]
    fn spread_requires_tuple() {
        assert!(spread_elements(Value::number(1)).is_err());
        let elems = spread_elements(Value::tuple(nums(&[4, 5])));
        assert_eq!(elems.ok(), Some(nums(&[4, 5])));
    }

    mod reduction_properties {
        use super::*;
        use proptest::prelude::*;

        fn leaf() -> impl Strategy<Value = Value> {
            prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(Value::number),
                "[a-z]{0,8}".prop_map(|s: String| Value::string(s)),
            ]
        }

        fn value_tree() -> impl Strategy<Value = Value> {
            leaf().prop_recursive(4, 32, 4, |inner| {
                prop::collection::vec(inner, 0..4).prop_map(Value::tuple)
            })
        }

        proptest! {
            /// tuple(x).truthy() == x.truthy()
            #[test]
            fn singleton_truth_matches_element(x in value_tree()) {
                let wrapped = Value::tuple(vec![x.clone()]);
                prop_assert_eq!(wrapped.is_truthy(), x.is_truthy());
            }

            /// tuple(x, y).single() reduces to y, recursively.
            #[test]
            fn pair_reduces_to_last(x in value_tree(), y in value_tree()) {
                let pair = Value::tuple(vec![x, y.clone()]);
                prop_assert_eq!(pair.single(), y.single());
            }

            /// Reduction is idempotent.
            #[test]
            fn single_is_idempotent(x in value_tree()) {
                let once = x.clone().single();
                prop_assert_eq!(once.clone().single(), once);
            }
        }
    }
}
