//! Key canonicalization.
//!
//! Every map key is folded into snake_case before it is looked up against
//! a declaration name: `firstName`, `FirstName` and `first-name` all become
//! `first_name`. Acronyms split the way ActiveSupport's `underscore` does
//! (`HTMLParser` -> `html_parser`). Folding is idempotent.

use serde_json::{Map, Value};

/// Fold a single key into its canonical snake_case form.
pub fn canonical_key(key: &str) -> String {
    let chars: Vec<char> = key.replace("::", "/").chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary {
                out.push('_');
            }
        }
        match c {
            '-' => out.push('_'),
            _ => out.push(c.to_ascii_lowercase()),
        }
    }
    out
}

/// Recursively canonicalize every key of every map inside `value`.
///
/// Sequences are walked element-wise; scalars are returned unchanged.
/// When two raw keys fold to the same canonical key the later one in
/// map order wins.
pub fn canonicalize_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(canonicalize_map(map)),
        Value::Array(items) => Value::Array(items.iter().map(canonicalize_keys).collect()),
        other => other.clone(),
    }
}

pub(crate) fn canonicalize_map(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .map(|(k, v)| (canonical_key(k), canonicalize_keys(v)))
        .collect()
}

/// Whether `key` is a textual sequence index such as `"0"` or `"12"`.
pub fn is_index_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric ordering for index keys without parsing (no overflow on
/// absurdly long indices). Leading zeros are ignored for magnitude.
pub(crate) fn index_order(a: &str, b: &str) -> std::cmp::Ordering {
    let ta = a.trim_start_matches('0');
    let tb = b.trim_start_matches('0');
    ta.len()
        .cmp(&tb.len())
        .then_with(|| ta.cmp(tb))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folds_camel_pascal_and_kebab_case() {
        assert_eq!(canonical_key("firstName"), "first_name");
        assert_eq!(canonical_key("FirstName"), "first_name");
        assert_eq!(canonical_key("first-name"), "first_name");
        assert_eq!(canonical_key("post_code"), "post_code");
        assert_eq!(canonical_key("HTMLParser"), "html_parser");
        assert_eq!(canonical_key("address2Line"), "address2_line");
        assert_eq!(canonical_key("Inventory::ProductForm"), "inventory/product_form");
    }

    #[test]
    fn folding_is_idempotent() {
        for key in ["firstName", "HTMLParser", "post-code", "ID", "countryCode"] {
            let once = canonical_key(key);
            assert_eq!(canonical_key(&once), once, "key {key}");
        }
    }

    #[test]
    fn canonicalizes_nested_maps_and_sequences() {
        let raw = json!({
            "firstName": "Andy",
            "homeAddress": { "post-code": "SW19 1AB" },
            "phoneNumbers": [{ "countryCode": "+34" }]
        });
        assert_eq!(
            canonicalize_keys(&raw),
            json!({
                "first_name": "Andy",
                "home_address": { "post_code": "SW19 1AB" },
                "phone_numbers": [{ "country_code": "+34" }]
            })
        );
    }

    #[test]
    fn index_keys_sort_numerically() {
        let mut keys = vec!["10", "2", "0", "1"];
        keys.sort_by(|a, b| index_order(a, b));
        assert_eq!(keys, vec!["0", "1", "2", "10"]);
        assert!(is_index_key("007"));
        assert!(!is_index_key(""));
        assert!(!is_index_key("1a"));
    }
}
