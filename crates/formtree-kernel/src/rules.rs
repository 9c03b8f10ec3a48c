//! Attribute-level validation rules.
//!
//! Each rule inspects one attribute value and yields a message on
//! failure. Messages follow ActiveModel's wording so rendered errors read
//! `"<key> can't be blank"`.

use crate::value::AttributeValue;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

pub const BLANK: &str = "can't be blank";
pub const INVALID: &str = "is invalid";
pub const NOT_INCLUDED: &str = "is not included in the list";
pub const NOT_A_NUMBER: &str = "is not a number";

/// A validation predicate attached to a declared attribute.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Fails on blank values: null, whitespace-only strings, empty
    /// sequences or maps, absent nested forms.
    Presence,
    /// String rendering of the scalar must match the pattern.
    Format(Regex),
    /// Character count for strings, element count for sequences.
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Inclusion(Vec<Value>),
    Numericality,
}

impl Rule {
    pub fn format(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Format)
    }

    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self::Length { min, max }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Format(_) => "format",
            Self::Length { .. } => "length",
            Self::Inclusion(_) => "inclusion",
            Self::Numericality => "numericality",
        }
    }

    /// Evaluate against `value`; `Some(message)` on failure.
    ///
    /// Only `Presence` fails on null. Every other rule skips it.
    pub fn check(&self, value: &AttributeValue) -> Option<String> {
        if let Self::Presence = self {
            return is_blank_attribute(value).then(|| BLANK.to_string());
        }
        if value.is_null() {
            return None;
        }

        match self {
            Self::Presence => None,
            Self::Format(pattern) => {
                let text = scalar_text(value.as_scalar()?)?;
                (!pattern.is_match(&text)).then(|| INVALID.to_string())
            }
            Self::Length { min, max } => {
                let (len, unit) = match value {
                    AttributeValue::Scalar(v) => (scalar_text(v)?.chars().count(), "characters"),
                    AttributeValue::List(items) => (items.len(), "elements"),
                    AttributeValue::Forms(nodes) => (nodes.len(), "elements"),
                    AttributeValue::Form(_) => return None,
                };
                if let Some(min) = min
                    && len < *min
                {
                    return Some(format!("is too short (minimum is {min} {unit})"));
                }
                if let Some(max) = max
                    && len > *max
                {
                    return Some(format!("is too long (maximum is {max} {unit})"));
                }
                None
            }
            Self::Inclusion(allowed) => {
                let scalar = value.as_scalar()?;
                (!allowed.contains(scalar)).then(|| NOT_INCLUDED.to_string())
            }
            Self::Numericality => {
                let numeric = match value.as_scalar()? {
                    Value::Number(_) => true,
                    Value::String(s) => s.trim().parse::<f64>().is_ok(),
                    _ => false,
                };
                (!numeric).then(|| NOT_A_NUMBER.to_string())
            }
        }
    }
}

/// Serialized rule syntax used by schema documents:
/// `"presence"`, `{ format = "^a" }`, `{ length = { min = 2 } }`,
/// `{ inclusion = ["a", "b"] }`, `"numericality"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSpec {
    Presence,
    Numericality,
    Format(String),
    Length {
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    Inclusion(Vec<Value>),
}

impl RuleSpec {
    pub fn compile(&self) -> Result<Rule, String> {
        Ok(match self {
            Self::Presence => Rule::Presence,
            Self::Numericality => Rule::Numericality,
            Self::Format(pattern) => Rule::format(pattern).map_err(|e| e.to_string())?,
            Self::Length { min, max } => {
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return Err(format!("length minimum {lo} exceeds maximum {hi}"));
                }
                Rule::length(*min, *max)
            }
            Self::Inclusion(allowed) => Rule::Inclusion(allowed.clone()),
        })
    }
}

/// Blank in the ActiveSupport sense.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(_) => false,
    }
}

fn is_blank_attribute(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Scalar(v) => is_blank(v),
        AttributeValue::List(items) => items.is_empty(),
        AttributeValue::Form(node) => node.is_none(),
        AttributeValue::Forms(nodes) => nodes.is_empty(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scalar(v: Value) -> AttributeValue {
        AttributeValue::Scalar(v)
    }

    #[test]
    fn presence_rejects_blank_values() {
        for blank in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
            assert_eq!(Rule::Presence.check(&scalar(blank)).as_deref(), Some(BLANK));
        }
        assert_eq!(Rule::Presence.check(&AttributeValue::Form(None)).as_deref(), Some(BLANK));
        assert_eq!(Rule::Presence.check(&AttributeValue::List(vec![])).as_deref(), Some(BLANK));
        assert_eq!(Rule::Presence.check(&scalar(json!("x"))), None);
        assert_eq!(Rule::Presence.check(&scalar(json!(0))), None);
    }

    #[test]
    fn non_presence_rules_skip_null() {
        let rules = [
            Rule::format("^a").unwrap(),
            Rule::length(Some(3), None),
            Rule::Inclusion(vec![json!("a")]),
            Rule::Numericality,
        ];
        for rule in &rules {
            assert_eq!(rule.check(&scalar(Value::Null)), None, "{rule:?}");
        }
    }

    #[test]
    fn format_matches_rendered_scalars() {
        let rule = Rule::format(r"^\d{3}$").unwrap();
        assert_eq!(rule.check(&scalar(json!("123"))), None);
        assert_eq!(rule.check(&scalar(json!(123))), None);
        assert_eq!(rule.check(&scalar(json!("12a"))).as_deref(), Some(INVALID));
    }

    #[test]
    fn length_counts_characters_and_elements() {
        let rule = Rule::length(Some(2), Some(3));
        assert_eq!(
            rule.check(&scalar(json!("a"))).as_deref(),
            Some("is too short (minimum is 2 characters)")
        );
        assert_eq!(
            rule.check(&AttributeValue::List(vec![json!(1); 4])).as_deref(),
            Some("is too long (maximum is 3 elements)")
        );
        assert_eq!(
            rule.check(&AttributeValue::Forms(Vec::new())).as_deref(),
            Some("is too short (minimum is 2 elements)")
        );
        assert_eq!(rule.check(&scalar(json!("héé"))), None);
    }

    #[test]
    fn inclusion_and_numericality() {
        let inclusion = Rule::Inclusion(vec![json!("red"), json!("blue")]);
        assert_eq!(inclusion.check(&scalar(json!("red"))), None);
        assert_eq!(inclusion.check(&scalar(json!("green"))).as_deref(), Some(NOT_INCLUDED));

        assert_eq!(Rule::Numericality.check(&scalar(json!("3.5"))), None);
        assert_eq!(Rule::Numericality.check(&scalar(json!(7))), None);
        assert_eq!(
            Rule::Numericality.check(&scalar(json!("seven"))).as_deref(),
            Some(NOT_A_NUMBER)
        );
    }

    #[test]
    fn rule_specs_deserialize_from_json() {
        let specs: Vec<RuleSpec> = serde_json::from_value(json!([
            "presence",
            { "format": "^[a-z]+$" },
            { "length": { "min": 2 } },
            { "inclusion": ["a", 1] },
            "numericality"
        ]))
        .unwrap();
        assert_eq!(specs[0], RuleSpec::Presence);
        assert_eq!(specs[2], RuleSpec::Length { min: Some(2), max: None });
        assert!(specs.iter().all(|s| s.compile().is_ok()));
    }

    #[test]
    fn rule_spec_compile_rejects_bad_input() {
        assert!(RuleSpec::Format("(".into()).compile().is_err());
        assert!(
            RuleSpec::Length { min: Some(5), max: Some(1) }
                .compile()
                .is_err()
        );
    }
}
