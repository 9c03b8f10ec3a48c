//! Key/value test double for code that consumes forms.
//!
//! [`StubForm`] answers `valid`/`invalid` with a canned result and exposes
//! whatever attributes it was given through [`AttributeAccess`], so command
//! and controller code can be exercised without declaring a form type.

use crate::error::FormError;
use crate::model::{Field, Model};
use crate::node::AttributeAccess;
use serde_json::{Map, Value};

/// Key holding the canned validation result in the constructor map.
pub const VALID_KEY: &str = "valid?";

#[derive(Debug, Clone, PartialEq)]
pub struct StubForm {
    attributes: Map<String, Value>,
    valid: bool,
}

impl StubForm {
    /// Build from a JSON object. A boolean under `"valid?"` sets the canned
    /// result (default `true`) and is not kept as an attribute.
    pub fn new(attributes: Value) -> Self {
        let mut attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let valid = attributes
            .remove(VALID_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        Self { attributes, valid }
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn invalid(&self) -> bool {
        !self.valid()
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

impl AttributeAccess for StubForm {
    fn get(&self, name: &str) -> Result<Value, FormError> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::UnknownAttribute {
                form: "stub".to_string(),
                name: name.to_string(),
            })
    }

    /// Any name may be assigned, declared up front or not.
    fn set(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

impl Model for StubForm {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        self.attributes.get(name).cloned().map(Field::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exposes_constructor_attributes() {
        let form = StubForm::new(json!({ "name": "Andy", "age": 38 }));
        assert_eq!(form.get("name").unwrap(), json!("Andy"));
        assert_eq!(form.get("age").unwrap(), json!(38));
        assert!(form.has("age"));
    }

    #[test]
    fn canned_validity() {
        assert!(StubForm::new(json!({ "valid?": true })).valid());
        assert!(!StubForm::new(json!({ "valid?": false })).valid());
        assert!(StubForm::new(json!({ "valid?": false })).invalid());
        assert!(StubForm::new(json!({})).valid());
    }

    #[test]
    fn attributes_exclude_validity_key() {
        let form = StubForm::new(json!({ "valid?": true, "name": "Andy", "age": 38 }));
        assert_eq!(
            Value::Object(form.attributes().clone()),
            json!({ "name": "Andy", "age": 38 })
        );
    }

    #[test]
    fn assignment_of_existing_and_new_attributes() {
        let mut form = StubForm::new(json!({ "name": "Andy" }));
        form.set("name", json!("Fred")).unwrap();
        form.set("twitter", json!("andypike")).unwrap();
        assert_eq!(form.get("name").unwrap(), json!("Fred"));
        assert_eq!(form.get("twitter").unwrap(), json!("andypike"));
    }

    #[test]
    fn unknown_names_fail_loudly() {
        let form = StubForm::new(json!({}));
        assert!(matches!(form.get("missing"), Err(FormError::UnknownAttribute { .. })));
    }
}
