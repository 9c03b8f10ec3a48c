//! Read access to domain objects.
//!
//! `from_model` only ever reads from a domain object, one named field at a
//! time. A field is either a plain value, another domain object (a
//! belongs-to style association) or a list of them (has-many).

use serde_json::{Map, Value};

pub enum Field<'a> {
    Value(Value),
    Model(&'a dyn Model),
    Models(Vec<&'a dyn Model>),
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Model(_) => f.write_str("Model(..)"),
            Self::Models(items) => write!(f, "Models(len={})", items.len()),
        }
    }
}

/// A domain object exposing named readable fields.
pub trait Model {
    /// The field called `name`, or `None` when the object has no such
    /// readable field.
    fn field(&self, name: &str) -> Option<Field<'_>>;
}

/// JSON documents act as domain objects: object members are fields.
///
/// Nested objects and arrays come back as `Field::Value`; the builder
/// reads them as models again when the declared kind is a nested form.
impl Model for Value {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        self.as_object()?.field(name)
    }
}

impl Model for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Field<'_>> {
        self.get(name).cloned().map(Field::Value)
    }
}
