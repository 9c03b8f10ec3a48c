//! Populated form trees.
//!
//! A [`FormNode`] is one instance of a declared [`FormType`]: one value per
//! declaration, an optional identity, an opaque context and the error map
//! written by validation. Nodes own their nested children exclusively.

use crate::build::bind_payload_value;
use crate::coerce::coerce;
use crate::error::FormError;
use crate::errors::Errors;
use crate::schema::{AttributeKind, FormType, IDENTITY};
use crate::validate::{ValidationOptions, validate};
use crate::value::AttributeValue;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FormNode {
    pub(crate) form: Arc<FormType>,
    pub(crate) id: Option<i64>,
    pub(crate) values: Vec<AttributeValue>,
    pub(crate) context: Option<Value>,
    pub(crate) errors: Errors,
}

impl FormNode {
    /// An empty node: every attribute at its zero value.
    pub fn new(form: &Arc<FormType>) -> Self {
        let values = form
            .declarations()
            .iter()
            .map(|d| AttributeValue::zero(d.kind()))
            .collect();
        Self {
            form: Arc::clone(form),
            id: None,
            values,
            context: None,
            errors: Errors::new(),
        }
    }

    pub fn form_type(&self) -> &Arc<FormType> {
        &self.form
    }

    pub fn form_name(&self) -> &str {
        self.form.name()
    }

    pub fn model_name(&self) -> &str {
        self.form.model_name()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    /// Identity present and greater than zero.
    pub fn persisted(&self) -> bool {
        self.id.is_some_and(|id| id > 0)
    }

    /// Form-builder key: `[id]` when an identity is present.
    pub fn to_key(&self) -> Option<Vec<i64>> {
        self.id.map(|id| vec![id])
    }

    /// Form-builder param: the identity, only once persisted.
    pub fn to_param(&self) -> Option<String> {
        self.persisted().then(|| self.id.map(|id| id.to_string())).flatten()
    }

    pub fn to_model(&self) -> &Self {
        self
    }

    pub fn attribute(&self, name: &str) -> Result<&AttributeValue, FormError> {
        let i = self.require(name)?;
        Ok(&self.values[i])
    }

    pub fn attribute_mut(&mut self, name: &str) -> Result<&mut AttributeValue, FormError> {
        let i = self.require(name)?;
        Ok(&mut self.values[i])
    }

    /// Scalar attribute value.
    pub fn scalar(&self, name: &str) -> Result<&Value, FormError> {
        self.attribute(name)?
            .as_scalar()
            .ok_or_else(|| self.mismatch(name))
    }

    /// Scalar sequence attribute value.
    pub fn list(&self, name: &str) -> Result<&[Value], FormError> {
        self.attribute(name)?
            .as_list()
            .ok_or_else(|| self.mismatch(name))
    }

    /// Nested form attribute value; `None` when unset.
    pub fn nested(&self, name: &str) -> Result<Option<&FormNode>, FormError> {
        match self.attribute(name)? {
            AttributeValue::Form(node) => Ok(node.as_deref()),
            _ => Err(self.mismatch(name)),
        }
    }

    /// Nested form collection attribute value.
    pub fn collection(&self, name: &str) -> Result<&[FormNode], FormError> {
        self.attribute(name)?
            .as_forms()
            .ok_or_else(|| self.mismatch(name))
    }

    pub fn collection_mut(&mut self, name: &str) -> Result<&mut Vec<FormNode>, FormError> {
        let mismatch = self.mismatch(name);
        match self.attribute_mut(name)? {
            AttributeValue::Forms(nodes) => Ok(nodes),
            _ => Err(mismatch),
        }
    }

    /// Assign an already typed value.
    ///
    /// The variant must match the declared kind and nested nodes must be of
    /// the declared form type. Scalars are coerced to the declared type,
    /// falling back to null.
    pub fn assign(&mut self, name: &str, value: impl Into<AttributeValue>) -> Result<(), FormError> {
        let i = self.require(name)?;
        let kind = self.form.declarations()[i].kind().clone();
        let value = value.into();

        let checked = match (&kind, value) {
            (AttributeKind::Scalar(t), AttributeValue::Scalar(v)) => {
                AttributeValue::Scalar(coerce(&v, *t).unwrap_or(Value::Null))
            }
            (AttributeKind::ArrayOfScalar(t), AttributeValue::List(items)) => AttributeValue::List(
                items
                    .iter()
                    .map(|v| coerce(v, *t).unwrap_or(Value::Null))
                    .collect(),
            ),
            (AttributeKind::NestedForm(form), AttributeValue::Form(node)) => {
                if let Some(node) = &node
                    && !Arc::ptr_eq(&node.form, form)
                {
                    return Err(self.mismatch(name));
                }
                AttributeValue::Form(node)
            }
            (AttributeKind::ArrayOfNestedForm(form), AttributeValue::Forms(nodes)) => {
                if nodes.iter().any(|n| !Arc::ptr_eq(&n.form, form)) {
                    return Err(self.mismatch(name));
                }
                AttributeValue::Forms(nodes)
            }
            _ => return Err(self.mismatch(name)),
        };
        self.values[i] = checked;
        Ok(())
    }

    /// Assign from raw payload data with the builder's per-kind conversion.
    ///
    /// Nested maps build nested nodes; malformed input degrades to the
    /// zero value. Only an undeclared name is an error.
    pub fn assign_payload(&mut self, name: &str, raw: &Value) -> Result<(), FormError> {
        let i = self.require(name)?;
        let form = Arc::clone(&self.form);
        self.values[i] = bind_payload_value(&form, &form.declarations()[i], raw);
        Ok(())
    }

    /// Attribute name -> JSON value, excluding the identity.
    pub fn attributes(&self) -> Map<String, Value> {
        self.form
            .declarations()
            .iter()
            .zip(&self.values)
            .map(|(d, v)| (d.name().to_string(), v.to_json()))
            .collect()
    }

    /// Like [`attributes`](Self::attributes) without null values.
    pub fn attributes_with_values(&self) -> Map<String, Value> {
        self.form
            .declarations()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !v.is_null())
            .map(|(d, v)| (d.name().to_string(), v.to_json()))
            .collect()
    }

    /// Attributes plus `id` when an identity is present.
    pub fn to_json(&self) -> Value {
        let mut map = self.attributes();
        if let Some(id) = self.id {
            map.insert(IDENTITY.to_string(), Value::from(id));
        }
        Value::Object(map)
    }

    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    /// Set the context on this node and every nested node present now.
    ///
    /// Children attached later do not inherit it until the next call.
    pub fn with_context(mut self, context: Value) -> Self {
        self.apply_context(&context);
        self
    }

    pub fn apply_context(&mut self, context: &Value) {
        self.context = Some(context.clone());
        for value in &mut self.values {
            match value {
                AttributeValue::Form(Some(child)) => child.apply_context(context),
                AttributeValue::Forms(children) => {
                    for child in children {
                        child.apply_context(context);
                    }
                }
                _ => {}
            }
        }
    }

    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    /// Run the validation pass; see [`validate`].
    pub fn valid(&mut self, options: &ValidationOptions) -> bool {
        validate(self, options)
    }

    pub fn invalid(&mut self, options: &ValidationOptions) -> bool {
        !self.valid(options)
    }

    fn require(&self, name: &str) -> Result<usize, FormError> {
        self.form
            .position(name)
            .ok_or_else(|| FormError::UnknownAttribute {
                form: self.form.name().to_string(),
                name: name.to_string(),
            })
    }

    fn mismatch(&self, name: &str) -> FormError {
        let expected = self
            .form
            .declaration(name)
            .map_or_else(|| "a declared attribute".to_string(), |d| d.kind().to_string());
        FormError::KindMismatch {
            form: self.form.name().to_string(),
            name: name.to_string(),
            expected,
        }
    }
}

impl PartialEq for FormNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.form, &other.form)
            && self.id == other.id
            && self.values == other.values
            && self.context == other.context
            && self.errors == other.errors
    }
}

/// Uniform name-based access shared by form nodes and test doubles.
pub trait AttributeAccess {
    /// Current value of `name` as plain JSON.
    fn get(&self, name: &str) -> Result<Value, FormError>;

    fn set(&mut self, name: &str, value: Value) -> Result<(), FormError>;

    fn has(&self, name: &str) -> bool;
}

impl AttributeAccess for FormNode {
    fn get(&self, name: &str) -> Result<Value, FormError> {
        if name == IDENTITY {
            return Ok(self.id.map_or(Value::Null, Value::from));
        }
        self.attribute(name).map(AttributeValue::to_json)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<(), FormError> {
        if name == IDENTITY {
            self.id = crate::coerce::identity(&value);
            return Ok(());
        }
        self.assign_payload(name, &value)
    }

    fn has(&self, name: &str) -> bool {
        name == IDENTITY || self.form.position(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ScalarType;
    use serde_json::json;

    fn contact() -> Arc<FormType> {
        FormType::builder("contact")
            .scalar("name", ScalarType::String)
            .build()
            .unwrap()
    }

    fn user() -> Arc<FormType> {
        let contact = contact();
        FormType::builder("user")
            .scalar("first_name", ScalarType::String)
            .scalar("age", ScalarType::Integer)
            .nested("primary_contact", &contact)
            .collection("contacts", &contact)
            .list("colours", ScalarType::Any)
            .build()
            .unwrap()
    }

    #[test]
    fn new_nodes_hold_zero_values() {
        let node = FormNode::new(&user());
        assert_eq!(node.scalar("first_name").unwrap(), &Value::Null);
        assert!(node.nested("primary_contact").unwrap().is_none());
        assert!(node.collection("contacts").unwrap().is_empty());
        assert!(node.list("colours").unwrap().is_empty());
        assert!(node.errors().is_empty());
        assert!(node.context().is_none());
    }

    #[test]
    fn unknown_attribute_access_fails_loudly() {
        let mut node = FormNode::new(&user());
        assert!(matches!(
            node.attribute("some_extra_data"),
            Err(FormError::UnknownAttribute { .. })
        ));
        assert!(node.set("some_extra_data", json!(1)).is_err());
        assert!(!node.has("some_extra_data"));
    }

    #[test]
    fn assign_coerces_and_checks_kind() {
        let form = user();
        let mut node = FormNode::new(&form);
        node.assign("age", json!("38")).unwrap();
        assert_eq!(node.scalar("age").unwrap(), &json!(38));

        let err = node.assign("contacts", json!("x")).unwrap_err();
        assert!(matches!(err, FormError::KindMismatch { .. }));

        let stranger = FormNode::new(&user());
        assert!(node.assign("primary_contact", stranger).is_err());

        let child_form = form.declaration("contacts").unwrap().kind().form_type().unwrap().clone();
        node.assign("contacts", vec![FormNode::new(&child_form)]).unwrap();
        assert_eq!(node.collection("contacts").unwrap().len(), 1);
    }

    #[test]
    fn persisted_requires_positive_identity() {
        let mut node = FormNode::new(&user());
        assert!(!node.persisted());
        for (id, expected) in [(Some(5), true), (Some(0), false), (Some(-1), false), (None, false)] {
            node.set_id(id);
            assert_eq!(node.persisted(), expected, "id {id:?}");
        }
    }

    #[test]
    fn form_builder_adapters() {
        let mut node = FormNode::new(&user());
        assert_eq!(node.to_key(), None);
        assert_eq!(node.to_param(), None);
        node.set_id(Some(2));
        assert_eq!(node.to_key(), Some(vec![2]));
        assert_eq!(node.to_param().as_deref(), Some("2"));
        assert!(std::ptr::eq(node.to_model(), &node));
    }

    #[test]
    fn attributes_exclude_identity_and_filter_nulls() {
        let mut node = FormNode::new(&user());
        node.set("id", json!(1)).unwrap();
        node.set("first_name", json!("Andy")).unwrap();

        let attributes = node.attributes();
        assert!(!attributes.contains_key("id"));
        assert_eq!(attributes["age"], Value::Null);

        let with_values = node.attributes_with_values();
        assert_eq!(with_values["first_name"], json!("Andy"));
        assert!(!with_values.contains_key("age"));
        assert!(!with_values.contains_key("primary_contact"));
        assert_eq!(with_values["contacts"], json!([]));
        assert_eq!(node.get("id").unwrap(), json!(1));
    }

    #[test]
    fn context_reaches_existing_children_only() {
        let form = user();
        let mut node = FormNode::new(&form);
        node.set("contacts", json!([{ "name": "Amber" }])).unwrap();
        node.set("primary_contact", json!({ "name": "Megan" })).unwrap();

        let mut node = node.with_context(json!({ "account_id": 1 }));
        assert_eq!(node.context().unwrap()["account_id"], 1);
        assert_eq!(
            node.nested("primary_contact").unwrap().unwrap().context(),
            Some(&json!({ "account_id": 1 }))
        );
        assert_eq!(node.collection("contacts").unwrap()[0].context().unwrap()["account_id"], 1);

        node.set("contacts", json!([{ "name": "Late" }])).unwrap();
        assert!(node.collection("contacts").unwrap()[0].context().is_none());
    }
}
