//! Recursive validation.
//!
//! At every node, top-down:
//!
//! 1. clear previous errors, run the `before_validation` hook
//! 2. attribute rules, then form-level validators (plain keys)
//! 3. unless `skip_nested`, validate each present nested form and merge
//!    its errors as `attribute.key`
//! 4. unless `skip_arrays`, validate each collection element and merge
//!    its errors as `attribute.key`, or `attribute[i].key` with
//!    `index_errors`
//!
//! A node is valid iff its error map is empty afterwards. Validation never
//! fails; failures are data.

use crate::errors::ErrorPath;
use crate::node::FormNode;
use crate::schema::AttributeKind;
use crate::value::AttributeValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Do not descend into nested form attributes.
    pub skip_nested: bool,
    /// Do not descend into nested form collections.
    pub skip_arrays: bool,
    /// Qualify collection error keys with the element index.
    pub index_errors: bool,
    /// Applied with `with_context` to the whole tree before validating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

pub fn validate(node: &mut FormNode, options: &ValidationOptions) -> bool {
    if let Some(context) = &options.context {
        node.apply_context(context);
    }
    validate_node(node, options)
}

fn validate_node(node: &mut FormNode, options: &ValidationOptions) -> bool {
    let form = Arc::clone(&node.form);
    node.errors.clear();

    if let Some(hook) = form.before_validation_hook() {
        hook(&mut *node);
    }

    for (decl, value) in form.declarations().iter().zip(&node.values) {
        for rule in decl.rules() {
            if let Some(message) = rule.check(value) {
                node.errors.merge(decl.name(), message);
            }
        }
    }

    let mut errors = std::mem::take(&mut node.errors);
    for validator in form.validators() {
        validator(&*node, &mut errors);
    }
    node.errors = errors;

    let FormNode { values, errors, .. } = &mut *node;
    for (decl, value) in form.declarations().iter().zip(values.iter_mut()) {
        match (decl.kind(), value) {
            (AttributeKind::NestedForm(_), AttributeValue::Form(Some(child)))
                if !options.skip_nested =>
            {
                if !validate_node(child, options) {
                    errors.merge_child(ErrorPath::Nested(decl.name()), &child.errors);
                }
            }
            (AttributeKind::ArrayOfNestedForm(_), AttributeValue::Forms(children))
                if !options.skip_arrays =>
            {
                for (i, child) in children.iter_mut().enumerate() {
                    if validate_node(child, options) {
                        continue;
                    }
                    let path = if options.index_errors {
                        ErrorPath::Indexed(decl.name(), i)
                    } else {
                        ErrorPath::Nested(decl.name())
                    };
                    errors.merge_child(path, &child.errors);
                }
            }
            _ => {}
        }
    }

    let valid = node.errors.is_empty();
    if !valid {
        debug!(
            form = form.name(),
            errors = node.errors.len(),
            "form node failed validation"
        );
    }
    valid
}
