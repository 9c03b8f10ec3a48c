//! Payload normalization.
//!
//! Turns an arbitrary nested payload into the canonical shape a form type
//! expects:
//!
//! - every key at every depth folded to snake_case
//! - every array attribute a sequence, with index-keyed maps such as
//!   `{"0": a, "1": b}` replaced by their values in ascending index order
//! - nested form values normalized against the nested type, and for
//!   collections each element after the index correction
//!
//! Undeclared keys are kept (keys folded) and later ignored by the
//! builder. Missing attributes stay missing. Normalization is idempotent.

use crate::keys::{canonical_key, canonicalize_keys, index_order, is_index_key};
use crate::schema::{AttributeKind, FormType};
use serde_json::{Map, Value};

pub fn normalize(raw: &Value, form: &FormType) -> Value {
    match raw {
        Value::Object(map) => Value::Object(normalize_map(map, form)),
        other => canonicalize_keys(other),
    }
}

pub(crate) fn normalize_map(map: &Map<String, Value>, form: &FormType) -> Map<String, Value> {
    map.iter()
        .map(|(key, value)| {
            let key = canonical_key(key);
            let value = match form.declaration(&key) {
                Some(decl) => normalize_attribute(decl.kind(), value),
                None => canonicalize_keys(value),
            };
            (key, value)
        })
        .collect()
}

fn normalize_attribute(kind: &AttributeKind, value: &Value) -> Value {
    match kind {
        AttributeKind::Scalar(_) => canonicalize_keys(value),
        AttributeKind::NestedForm(nested) => normalize(value, nested),
        AttributeKind::ArrayOfScalar(_) => match as_sequence(value) {
            Some(items) => Value::Array(items.into_iter().map(canonicalize_keys).collect()),
            None => canonicalize_keys(value),
        },
        AttributeKind::ArrayOfNestedForm(nested) => match as_sequence(value) {
            Some(items) => Value::Array(items.into_iter().map(|v| normalize(v, nested)).collect()),
            None => canonicalize_keys(value),
        },
    }
}

/// Sequence view of an array attribute's raw value.
///
/// Proper sequences pass through; maps whose keys are all textual indices
/// (contiguous or not) become their values in ascending index order. Any
/// other shape is not a sequence.
fn as_sequence(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(map) if map.keys().all(|k| is_index_key(k)) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| index_order(a, b));
            tracing::trace!(entries = entries.len(), "index-keyed map read as sequence");
            Some(entries.into_iter().map(|(_, v)| v).collect())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;
    use serde_json::json;
    use std::sync::Arc;

    fn user() -> Arc<FormType> {
        let phone = FormType::builder("phone")
            .scalar("number", ScalarType::String)
            .scalar("country_code", ScalarType::String)
            .build()
            .unwrap();
        let contact = FormType::builder("contact")
            .scalar("name", ScalarType::String)
            .collection("phones", &phone)
            .build()
            .unwrap();
        let address = FormType::builder("address")
            .scalar("post_code", ScalarType::String)
            .build()
            .unwrap();
        FormType::builder("user")
            .scalar("first_name", ScalarType::String)
            .list("colours", ScalarType::String)
            .nested("address", &address)
            .nested("primary_contact", &contact)
            .collection("contacts", &contact)
            .build()
            .unwrap()
    }

    #[test]
    fn folds_keys_at_every_depth() {
        let raw = json!({
            "first-name": "Andy",
            "address": { "postCode": "SW19 1AB" },
            "someExtra": { "innerKey": 1 }
        });
        assert_eq!(
            normalize(&raw, &user()),
            json!({
                "first_name": "Andy",
                "address": { "post_code": "SW19 1AB" },
                "some_extra": { "inner_key": 1 }
            })
        );
    }

    #[test]
    fn index_keyed_maps_become_sequences_in_index_order() {
        let form = user();
        let indexed = json!({ "contacts": {
            "10": { "name": "Last" },
            "2": { "name": "Megan" },
            "0": { "name": "Amber" }
        }});
        let listed = json!({ "contacts": [
            { "name": "Amber" },
            { "name": "Megan" },
            { "name": "Last" }
        ]});
        assert_eq!(normalize(&indexed, &form), normalize(&listed, &form));
        assert_eq!(normalize(&indexed, &form)["contacts"][2]["name"], "Last");
    }

    #[test]
    fn array_correction_runs_before_element_normalization() {
        let raw = json!({
            "contacts": {
                "0": {
                    "name": "Amber",
                    "phones": {
                        "1": { "number": "222", "countryCode": "+34" },
                        "0": { "number": "111", "countryCode": "+34" }
                    }
                }
            },
            "primaryContact": {
                "phones": { "0": { "number": "333" } }
            }
        });
        let normalized = normalize(&raw, &user());
        assert_eq!(
            normalized["contacts"][0]["phones"],
            json!([
                { "number": "111", "country_code": "+34" },
                { "number": "222", "country_code": "+34" }
            ])
        );
        assert_eq!(normalized["primary_contact"]["phones"], json!([{ "number": "333" }]));
    }

    #[test]
    fn scalar_arrays_and_empty_index_maps() {
        let raw = json!({ "colours": { "1": "blue", "0": "red" }, "contacts": {} });
        let normalized = normalize(&raw, &user());
        assert_eq!(normalized["colours"], json!(["red", "blue"]));
        assert_eq!(normalized["contacts"], json!([]));
    }

    #[test]
    fn non_index_maps_for_arrays_are_left_alone() {
        let raw = json!({ "colours": { "primary": "red" } });
        assert_eq!(normalize(&raw, &user())["colours"], json!({ "primary": "red" }));
    }

    #[test]
    fn missing_attributes_stay_missing() {
        let normalized = normalize(&json!({ "firstName": "Andy" }), &user());
        assert_eq!(normalized.as_object().unwrap().len(), 1);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!({
            "firstName": "Andy",
            "colours": { "0": "red" },
            "contacts": { "1": { "Name": "B" }, "0": { "name": "A", "phones": { "0": { "countryCode": "+1" } } } },
            "address": { "post-code": "X" },
            "other": [{ "camelKey": { "0": 1 } }]
        });
        let form = user();
        let once = normalize(&raw, &form);
        assert_eq!(normalize(&once, &form), once);
    }
}
