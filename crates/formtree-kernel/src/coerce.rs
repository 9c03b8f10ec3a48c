//! Scalar coercion.
//!
//! `None` means the value cannot be coerced; callers substitute the zero
//! value. Null and blank strings coerce to null for typed scalars, so a
//! cleared text field binds as "no value" rather than failing.

use crate::schema::ScalarType;
use serde_json::{Number, Value};

pub fn coerce(value: &Value, target: ScalarType) -> Option<Value> {
    if target == ScalarType::Any {
        return Some(value.clone());
    }
    if value.is_null() {
        return Some(Value::Null);
    }

    match target {
        ScalarType::Any => Some(value.clone()),
        ScalarType::String => match value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        ScalarType::Integer => match value {
            Value::Number(n) => integer_from_number(n),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Some(Value::Null);
                }
                s.parse::<i64>()
                    .ok()
                    .map(Value::from)
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        },
        ScalarType::Float => match value {
            Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Some(Value::Null);
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
            _ => None,
        },
        ScalarType::Boolean => match value {
            Value::Bool(_) => Some(value.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(Value::Bool(true)),
                Some(0) => Some(Value::Bool(false)),
                _ => None,
            },
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "" => Some(Value::Null),
                "true" | "t" | "1" | "yes" | "y" | "on" => Some(Value::Bool(true)),
                "false" | "f" | "0" | "no" | "n" | "off" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
    }
}

fn integer_from_number(n: &Number) -> Option<Value> {
    if let Some(i) = n.as_i64() {
        return Some(Value::from(i));
    }
    n.as_f64().and_then(integral)
}

fn integral(f: f64) -> Option<Value> {
    // i64::MAX rounds up to 2^63 as f64, which is out of range.
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then(|| Value::from(f as i64))
}

/// Identity attribute: integers, integral floats and numeric strings.
pub fn identity(value: &Value) -> Option<i64> {
    coerce(value, ScalarType::Integer)?.as_i64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_from_numbers_and_strings() {
        assert_eq!(coerce(&json!("38"), ScalarType::Integer), Some(json!(38)));
        assert_eq!(coerce(&json!(" 7 "), ScalarType::Integer), Some(json!(7)));
        assert_eq!(coerce(&json!(4.0), ScalarType::Integer), Some(json!(4)));
        assert_eq!(coerce(&json!("2.0"), ScalarType::Integer), Some(json!(2)));
        assert_eq!(coerce(&json!(""), ScalarType::Integer), Some(Value::Null));
        assert_eq!(coerce(&json!("abc"), ScalarType::Integer), None);
        assert_eq!(coerce(&json!(2.5), ScalarType::Integer), None);
        assert_eq!(coerce(&json!({"a": 1}), ScalarType::Integer), None);
    }

    #[test]
    fn integers_out_of_i64_range_do_not_saturate() {
        assert_eq!(coerce(&json!(9.223372036854775808e18), ScalarType::Integer), None);
        assert_eq!(coerce(&json!("9223372036854775808.0"), ScalarType::Integer), None);
        assert_eq!(
            coerce(&json!(-9.223372036854775808e18), ScalarType::Integer),
            Some(json!(i64::MIN))
        );
    }

    #[test]
    fn strings_render_numbers_and_booleans() {
        assert_eq!(coerce(&json!(123), ScalarType::String), Some(json!("123")));
        assert_eq!(coerce(&json!(true), ScalarType::String), Some(json!("true")));
        assert_eq!(coerce(&json!(["a"]), ScalarType::String), None);
    }

    #[test]
    fn booleans_accept_common_spellings() {
        assert_eq!(coerce(&json!("yes"), ScalarType::Boolean), Some(json!(true)));
        assert_eq!(coerce(&json!("0"), ScalarType::Boolean), Some(json!(false)));
        assert_eq!(coerce(&json!(1), ScalarType::Boolean), Some(json!(true)));
        assert_eq!(coerce(&json!("maybe"), ScalarType::Boolean), None);
    }

    #[test]
    fn floats_and_any() {
        assert_eq!(coerce(&json!("1.5"), ScalarType::Float), Some(json!(1.5)));
        assert_eq!(coerce(&json!(2), ScalarType::Float), Some(json!(2.0)));
        let blob = json!({"tempfile": "x"});
        assert_eq!(coerce(&blob, ScalarType::Any), Some(blob.clone()));
    }

    #[test]
    fn identity_values() {
        assert_eq!(identity(&json!("1")), Some(1));
        assert_eq!(identity(&json!(5)), Some(5));
        assert_eq!(identity(&json!(null)), None);
        assert_eq!(identity(&json!("x")), None);
    }
}
