//! Attribute values held by a [`FormNode`](crate::node::FormNode).

use crate::node::FormNode;
use crate::schema::AttributeKind;
use serde_json::Value;

/// The current value of one declared attribute.
///
/// The variant always matches the attribute's declared kind:
/// `Scalar` for `Scalar(T)`, `List` for `ArrayOfScalar(T)`, `Form` for
/// `NestedForm(G)` and `Forms` for `ArrayOfNestedForm(G)`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(Value),
    List(Vec<Value>),
    Form(Option<Box<FormNode>>),
    Forms(Vec<FormNode>),
}

impl AttributeValue {
    /// The zero value for a kind: null scalars, absent nested forms and
    /// empty sequences (never null).
    pub fn zero(kind: &AttributeKind) -> Self {
        match kind {
            AttributeKind::Scalar(_) => Self::Scalar(Value::Null),
            AttributeKind::ArrayOfScalar(_) => Self::List(Vec::new()),
            AttributeKind::NestedForm(_) => Self::Form(None),
            AttributeKind::ArrayOfNestedForm(_) => Self::Forms(Vec::new()),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_scalar().and_then(Value::as_i64)
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&FormNode> {
        match self {
            Self::Form(node) => node.as_deref(),
            _ => None,
        }
    }

    pub fn as_forms(&self) -> Option<&[FormNode]> {
        match self {
            Self::Forms(nodes) => Some(nodes),
            _ => None,
        }
    }

    /// Null scalar or absent nested form. Sequences are never null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Value::Null) | Self::Form(None))
    }

    /// Render as plain JSON; nested nodes render their attributes plus `id`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Scalar(v) => v.clone(),
            Self::List(items) => Value::Array(items.clone()),
            Self::Form(node) => node.as_ref().map_or(Value::Null, |n| n.to_json()),
            Self::Forms(nodes) => Value::Array(nodes.iter().map(FormNode::to_json).collect()),
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<FormNode> for AttributeValue {
    fn from(node: FormNode) -> Self {
        Self::Form(Some(Box::new(node)))
    }
}

impl From<Vec<FormNode>> for AttributeValue {
    fn from(nodes: Vec<FormNode>) -> Self {
        Self::Forms(nodes)
    }
}
