//! # Formtree Kernel
//!
//! Declarative form objects: a form type declares typed attributes, some of
//! which are themselves nested forms or collections of nested forms. The
//! kernel binds loosely shaped input onto a tree of form nodes and validates
//! the whole tree, merging child errors into their parents under qualified
//! keys.
//!
//! ## Architecture
//!
//! ```text
//! FormType / SchemaRegistry   ← declarations, rules, hooks (acyclic, shared)
//!     │
//! normalize                   ← snake_case keys, index maps → sequences
//!     │
//! FormNode::from_*            ← payload / params / model / JSON → tree
//!     │
//! validate                    ← rules, validators, nested merge → Errors
//! ```
//!
//! Input never causes a build to fail: undeclared keys are ignored and
//! values of the wrong shape fall back to the attribute's zero value.
//! Only schema mistakes and access to undeclared names are errors.

pub mod build;
pub mod coerce;
pub mod error;
pub mod errors;
pub mod keys;
pub mod model;
pub mod node;
pub mod normalize;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod stub;
pub mod validate;
pub mod value;

pub use error::{FormError, SchemaError};
pub use errors::{ErrorPath, Errors};
pub use keys::{canonical_key, canonicalize_keys};
pub use model::{Field, Model};
pub use node::{AttributeAccess, FormNode};
pub use normalize::normalize;
pub use registry::{AttributeSpec, FormSpec, SchemaDocument, SchemaRegistry};
pub use rules::{Rule, RuleSpec};
pub use schema::{AttributeDeclaration, AttributeKind, FormType, FormTypeBuilder, ScalarType};
pub use stub::StubForm;
pub use validate::{ValidationOptions, validate};
pub use value::AttributeValue;
