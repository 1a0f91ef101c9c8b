//! Total serialization of runtime values for trace snapshots.
//!
//! Locals captured at a probe can be anything a handler holds. Snapshots must
//! never fail: values with a structural JSON form pass through unchanged, and
//! everything else degrades to its `{:?}` rendering as a string.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

/// Convert `value` into a transport-safe [`Value`].
///
/// Structural encoding is attempted first; on any encoder failure (erroring
/// `Serialize` impls, non-finite floats) the textual rendering is used
/// instead. This function never panics and never returns an error.
pub fn serialize<T: Serialize + Debug>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(encoded) => encoded,
        Err(_) => Value::String(format!("{:?}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::serialize;
    use proptest::prelude::*;
    use serde::Serializer;
    use serde_json::{json, Value};

    /// A value with no structural form: its `Serialize` impl always errors.
    struct Opaque;

    impl serde::Serialize for Opaque {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no structural form"))
        }
    }

    impl std::fmt::Debug for Opaque {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Opaque")
        }
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(serialize(&42i64), json!(42));
        assert_eq!(serialize(&"hello"), json!("hello"));
        assert_eq!(serialize(&true), json!(true));
        assert_eq!(serialize(&vec![1, 2, 3]), json!([1, 2, 3]));
        assert_eq!(serialize(&Option::<i32>::None), Value::Null);
    }

    #[test]
    fn non_finite_floats_fall_back_to_text() {
        assert_eq!(serialize(&f64::NAN), json!("NaN"));
        assert_eq!(serialize(&f64::INFINITY), json!("inf"));
    }

    #[test]
    fn unencodable_values_fall_back_to_debug() {
        assert_eq!(serialize(&Opaque), json!("Opaque"));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{0,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn json_representable_values_round_trip(value in arb_json()) {
            prop_assert_eq!(serialize(&value), value);
        }
    }
}
