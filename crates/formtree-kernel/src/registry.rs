//! Named form types and schema documents.
//!
//! Form types declared in code register directly. Form types declared in a
//! schema document (TOML or JSON, deserialized with serde) are resolved in
//! dependency order: nested and parent types first. References to unknown
//! types and reference cycles are rejected, so every registered type is
//! acyclic.

use crate::error::SchemaError;
use crate::rules::RuleSpec;
use crate::schema::{AttributeKind, FormType, ScalarType};
use crate::validate::ValidationOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Default validation options for callers that do not pass their own.
    #[serde(default)]
    pub defaults: ValidationOptions,
    #[serde(default)]
    pub forms: BTreeMap<String, FormSpec>,
}

impl SchemaDocument {
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormSpec {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

/// `type = "integer"` / `"[string]"` for scalars, `form = "address"` /
/// `"[contact]"` for nested forms. Neither means an untyped scalar.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub scalar: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    forms: BTreeMap<String, Arc<FormType>>,
    defaults: ValidationOptions,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, form: Arc<FormType>) -> Result<(), SchemaError> {
        if self.forms.contains_key(form.name()) {
            return Err(SchemaError::DuplicateForm(form.name().to_string()));
        }
        self.forms.insert(form.name().to_string(), form);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FormType>> {
        self.forms.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Arc<FormType>, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::UnknownFormType {
            form: "<registry>".to_string(),
            reference: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FormType>> {
        self.forms.values()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn defaults(&self) -> &ValidationOptions {
        &self.defaults
    }

    pub fn from_document(document: &SchemaDocument) -> Result<Self, SchemaError> {
        let mut resolver = Resolver {
            document,
            resolved: BTreeMap::new(),
            stack: Vec::new(),
        };
        for name in document.forms.keys() {
            resolver.resolve(name, name)?;
        }
        Ok(Self {
            forms: resolver.resolved,
            defaults: document.defaults.clone(),
        })
    }
}

struct Resolver<'a> {
    document: &'a SchemaDocument,
    resolved: BTreeMap<String, Arc<FormType>>,
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve(&mut self, referrer: &str, name: &str) -> Result<Arc<FormType>, SchemaError> {
        if let Some(form) = self.resolved.get(name) {
            return Ok(Arc::clone(form));
        }
        if let Some(start) = self.stack.iter().position(|n| n == name) {
            let mut path = self.stack[start..].to_vec();
            path.push(name.to_string());
            return Err(SchemaError::CyclicNesting { path });
        }
        let document = self.document;
        let spec = document
            .forms
            .get(name)
            .ok_or_else(|| SchemaError::UnknownFormType {
                form: referrer.to_string(),
                reference: name.to_string(),
            })?;

        self.stack.push(name.to_string());
        let mut builder = FormType::builder(name);
        if let Some(parent) = &spec.extends {
            let parent = self.resolve(name, parent)?;
            builder = builder.extends(&parent);
        }
        if let Some(model_name) = &spec.model_name {
            builder = builder.model_name(model_name);
        }
        for attribute in &spec.attributes {
            let kind = self.attribute_kind(name, attribute)?;
            builder = builder.attribute(attribute.name.clone(), kind);
            for rule in &attribute.rules {
                let rule = rule.compile().map_err(|message| SchemaError::InvalidRule {
                    form: name.to_string(),
                    name: attribute.name.clone(),
                    message,
                })?;
                builder = builder.validates(&attribute.name, rule);
            }
        }
        self.stack.pop();

        let form = builder.build()?;
        self.resolved.insert(name.to_string(), Arc::clone(&form));
        Ok(form)
    }

    fn attribute_kind(
        &mut self,
        form: &str,
        attribute: &AttributeSpec,
    ) -> Result<AttributeKind, SchemaError> {
        let invalid = |message: String| SchemaError::InvalidRule {
            form: form.to_string(),
            name: attribute.name.clone(),
            message,
        };

        match (&attribute.scalar, &attribute.form) {
            (Some(_), Some(_)) => Err(invalid(
                "declare either `type` or `form`, not both".to_string(),
            )),
            (None, None) => Ok(AttributeKind::Scalar(ScalarType::Any)),
            (Some(scalar), None) => {
                let (is_array, inner) = split_type_ref(scalar);
                let scalar: ScalarType = inner.parse().map_err(invalid)?;
                Ok(if is_array {
                    AttributeKind::ArrayOfScalar(scalar)
                } else {
                    AttributeKind::Scalar(scalar)
                })
            }
            (None, Some(reference)) => {
                let (is_array, inner) = split_type_ref(reference);
                let nested = self.resolve(form, inner)?;
                Ok(if is_array {
                    AttributeKind::ArrayOfNestedForm(nested)
                } else {
                    AttributeKind::NestedForm(nested)
                })
            }
        }
    }
}

/// `"[contact]"` -> `(true, "contact")`, `"contact"` -> `(false, "contact")`.
fn split_type_ref(raw: &str) -> (bool, &str) {
    let raw = raw.trim();
    match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        Some(inner) => (true, inner.trim()),
        None => (false, raw),
    }
}
