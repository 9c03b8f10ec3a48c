//! Tree building.
//!
//! Four entry points produce a populated [`FormNode`] for a form type:
//!
//! - [`FormNode::from_payload`]: canonical payload plus caller extras
//! - [`FormNode::from_params`]: full request params keyed by model name
//! - [`FormNode::from_model`]: a domain object, then the `map_model` hook
//! - [`FormNode::from_json`]: JSON text, normalized then bound as payload
//!
//! Building never mutates its source and never fails on malformed data:
//! values that cannot be bound degrade to the attribute's zero value.

use crate::coerce::{coerce, identity};
use crate::error::FormError;
use crate::keys::canonicalize_map;
use crate::model::{Field, Model};
use crate::node::FormNode;
use crate::normalize::{normalize, normalize_map};
use crate::schema::{AttributeDeclaration, AttributeKind, FormType, IDENTITY, ScalarType};
use crate::value::AttributeValue;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

impl FormNode {
    /// Bind a canonical payload.
    ///
    /// Each declaration takes the payload value of the same name, falling
    /// back to `extras`, else stays at its zero value. Identity comes from
    /// the payload's top-level `id`. Extras only apply at the root.
    pub fn from_payload(form: &Arc<FormType>, payload: &Value, extras: &Map<String, Value>) -> Self {
        let empty = Map::new();
        let fields = payload.as_object().unwrap_or(&empty);
        let extras = normalize_map(&canonicalize_map(extras), form);

        let mut node = FormNode::new(form);
        node.id = fields.get(IDENTITY).and_then(identity);
        bind_fields(&mut node, &[fields, &extras]);

        debug!(form = form.name(), source = "payload", "built form node");
        node
    }

    /// Bind full request params.
    ///
    /// Form fields live under the form's model name (`{"user": {...}}`).
    /// Each declaration is looked up in that map, then in the root-level
    /// params, then in `extras`. Identity comes from the root `id`, else
    /// from the form-level one.
    pub fn from_params(form: &Arc<FormType>, params: &Value, extras: &Map<String, Value>) -> Self {
        let root = match params {
            Value::Object(map) => canonicalize_map(map),
            _ => Map::new(),
        };
        let scoped = match root.get(form.model_name()) {
            Some(Value::Object(fields)) => normalize_map(fields, form),
            _ => Map::new(),
        };
        let root = normalize_map(&root, form);
        let extras = normalize_map(&canonicalize_map(extras), form);

        let mut node = FormNode::new(form);
        node.id = root
            .get(IDENTITY)
            .and_then(identity)
            .or_else(|| scoped.get(IDENTITY).and_then(identity));
        bind_fields(&mut node, &[&scoped, &root, &extras]);

        debug!(form = form.name(), source = "params", "built form node");
        node
    }

    /// Read every declared attribute the domain object exposes, then run
    /// the form's `map_model` hook with the original object.
    pub fn from_model(form: &Arc<FormType>, model: &dyn Model) -> Self {
        let mut node = FormNode::new(form);
        if let Some(Field::Value(id)) = model.field(IDENTITY) {
            node.id = identity(&id);
        }

        for (i, decl) in form.declarations().iter().enumerate() {
            if let Some(field) = model.field(decl.name()) {
                node.values[i] = bind_model_field(form, decl, field);
            }
        }

        if let Some(hook) = form.map_model_hook() {
            hook(&mut node, model);
        }

        debug!(form = form.name(), source = "model", "built form node");
        node
    }

    /// Parse `text` as JSON, normalize it and bind it as a payload.
    pub fn from_json(form: &Arc<FormType>, text: &str) -> Result<Self, FormError> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| FormError::InvalidJson(e.to_string()))?;
        let payload = normalize(&raw, form);
        Ok(Self::from_payload(form, &payload, &Map::new()))
    }
}

fn bind_fields(node: &mut FormNode, sources: &[&Map<String, Value>]) {
    let form = Arc::clone(&node.form);
    for (i, decl) in form.declarations().iter().enumerate() {
        if let Some(value) = sources.iter().find_map(|source| source.get(decl.name())) {
            node.values[i] = bind_payload_value(&form, decl, value);
        }
    }
}

/// Per-kind conversion of one payload value.
pub(crate) fn bind_payload_value(
    form: &FormType,
    decl: &AttributeDeclaration,
    value: &Value,
) -> AttributeValue {
    match decl.kind() {
        AttributeKind::Scalar(t) => AttributeValue::Scalar(coerce_or_zero(form, decl, value, *t)),
        AttributeKind::ArrayOfScalar(t) => match value {
            Value::Array(items) => AttributeValue::List(
                items
                    .iter()
                    .map(|v| coerce_or_zero(form, decl, v, *t))
                    .collect(),
            ),
            other => degrade(form, decl, other),
        },
        AttributeKind::NestedForm(nested) => match value {
            Value::Object(_) => {
                AttributeValue::from(FormNode::from_payload(nested, value, &Map::new()))
            }
            other => degrade(form, decl, other),
        },
        AttributeKind::ArrayOfNestedForm(nested) => match value {
            Value::Array(items) => AttributeValue::Forms(
                items
                    .iter()
                    .filter(|item| {
                        let keep = item.is_object();
                        if !keep {
                            trace!(
                                form = form.name(),
                                attribute = decl.name(),
                                "skipping non-map collection element"
                            );
                        }
                        keep
                    })
                    .map(|item| FormNode::from_payload(nested, item, &Map::new()))
                    .collect(),
            ),
            other => degrade(form, decl, other),
        },
    }
}

fn bind_model_field(form: &FormType, decl: &AttributeDeclaration, field: Field<'_>) -> AttributeValue {
    match (decl.kind(), field) {
        (AttributeKind::NestedForm(nested), Field::Model(model)) => {
            AttributeValue::from(FormNode::from_model(nested, model))
        }
        (AttributeKind::NestedForm(nested), Field::Value(value @ Value::Object(_))) => {
            AttributeValue::from(FormNode::from_model(nested, &value))
        }
        (AttributeKind::ArrayOfNestedForm(nested), Field::Models(models)) => AttributeValue::Forms(
            models
                .into_iter()
                .map(|model| FormNode::from_model(nested, model))
                .collect(),
        ),
        (AttributeKind::ArrayOfNestedForm(nested), Field::Value(Value::Array(items))) => {
            AttributeValue::Forms(
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .map(|item| FormNode::from_model(nested, item))
                    .collect(),
            )
        }
        (AttributeKind::Scalar(_) | AttributeKind::ArrayOfScalar(_), Field::Value(value)) => {
            bind_payload_value(form, decl, &value)
        }
        (kind, field) => {
            trace!(
                form = form.name(),
                attribute = decl.name(),
                field = ?field,
                "model field does not fit {kind}, using zero value"
            );
            AttributeValue::zero(kind)
        }
    }
}

fn coerce_or_zero(form: &FormType, decl: &AttributeDeclaration, value: &Value, t: ScalarType) -> Value {
    coerce(value, t).unwrap_or_else(|| {
        trace!(
            form = form.name(),
            attribute = decl.name(),
            value = json_type(value),
            "cannot coerce to {t}, using zero value"
        );
        Value::Null
    })
}

fn degrade(form: &FormType, decl: &AttributeDeclaration, value: &Value) -> AttributeValue {
    if !value.is_null() {
        trace!(
            form = form.name(),
            attribute = decl.name(),
            value = json_type(value),
            "value does not fit {}, using zero value",
            decl.kind()
        );
    }
    AttributeValue::zero(decl.kind())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
