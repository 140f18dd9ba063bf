//! Closed value model for arguments, expected outputs and actual outputs
//!
//! Values are JSON values: null, boolean, number, string, ordered sequence and
//! string-keyed mapping. Equality is structural and recursive.

use serde_json::Number;

/// A test-case value
pub type Value = serde_json::Value;

/// Structural equality over the value model.
///
/// Numbers compare by numeric value, so `3` equals `3.0`. Booleans are never
/// numbers. Floating point comparison is exact.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    // One side is negative and the other exceeds i64, or at least one is a float
    match (a.is_f64() || b.is_f64(), a.as_f64(), b.as_f64()) {
        (true, Some(x), Some(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert!(values_equal(&json!(null), &json!(null)));
        assert!(values_equal(&json!("abc"), &json!("abc")));
        assert!(!values_equal(&json!("abc"), &json!("abd")));
        assert!(values_equal(&json!(true), &json!(true)));
        assert!(!values_equal(&json!(true), &json!(false)));
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(values_equal(&json!(3), &json!(3.0)));
        assert!(values_equal(&json!(-10), &json!(-10)));
        assert!(!values_equal(&json!(-1), &json!(3)));
        assert!(!values_equal(&json!(0.1), &json!(0.10000001)));
        assert!(!values_equal(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn test_booleans_are_not_numbers() {
        assert!(!values_equal(&json!(true), &json!(1)));
        assert!(!values_equal(&json!(0), &json!(false)));
        assert!(!values_equal(&json!(null), &json!(0)));
    }

    #[test]
    fn test_nested_structures() {
        let a = json!({"xs": [1, 2, {"k": "v"}], "n": null});
        let b = json!({"n": null, "xs": [1.0, 2, {"k": "v"}]});
        assert!(values_equal(&a, &b));

        let c = json!({"xs": [1, 2, {"k": "w"}], "n": null});
        assert!(!values_equal(&a, &c));

        assert!(!values_equal(&json!([1, 2]), &json!([1, 2, 3])));
        assert!(!values_equal(&json!({"a": 1}), &json!({"b": 1})));
    }
}
