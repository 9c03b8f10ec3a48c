//! Form type declarations.
//!
//! A [`FormType`] is the static, immutable declaration of one form: an
//! ordered list of attributes (name, kind, rules), optional hooks, and the
//! model name used as its params key. Types are built once through
//! [`FormType::builder`] and shared behind `Arc`; every [`FormNode`] of the
//! type refers to the same declaration.
//!
//! Nested kinds hold the nested type by `Arc`, so a type can only nest types
//! that already exist. Schemas are acyclic by construction.
//!
//! [`FormNode`]: crate::node::FormNode

use crate::errors::Errors;
use crate::error::SchemaError;
use crate::keys::canonical_key;
use crate::model::Model;
use crate::node::FormNode;
use crate::rules::Rule;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Attribute name reserved for node identity.
pub const IDENTITY: &str = "id";

/// Primitive type of a scalar attribute or scalar sequence element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarType {
    /// No coercion; any JSON value is kept as is.
    #[default]
    Any,
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "string" | "str" | "text" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "float" | "number" | "decimal" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            _ => Err(format!("unknown scalar type: {s}")),
        }
    }
}

/// Closed set of attribute kinds, resolved when the type is declared.
#[derive(Clone)]
pub enum AttributeKind {
    Scalar(ScalarType),
    NestedForm(Arc<FormType>),
    ArrayOfScalar(ScalarType),
    ArrayOfNestedForm(Arc<FormType>),
}

impl AttributeKind {
    pub fn is_array(&self) -> bool {
        matches!(self, Self::ArrayOfScalar(_) | Self::ArrayOfNestedForm(_))
    }

    /// The nested form type for `NestedForm` and `ArrayOfNestedForm`.
    pub fn form_type(&self) -> Option<&Arc<FormType>> {
        match self {
            Self::NestedForm(form) | Self::ArrayOfNestedForm(form) => Some(form),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(t) => write!(f, "{t}"),
            Self::NestedForm(form) => write!(f, "form {}", form.name()),
            Self::ArrayOfScalar(t) => write!(f, "[{t}]"),
            Self::ArrayOfNestedForm(form) => write!(f, "[form {}]", form.name()),
        }
    }
}

impl fmt::Debug for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeKind({self})")
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeDeclaration {
    name: String,
    kind: AttributeKind,
    rules: Vec<Rule>,
}

impl AttributeDeclaration {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

pub type BeforeValidationHook = Arc<dyn Fn(&mut FormNode) + Send + Sync>;
pub type MapModelHook = Arc<dyn Fn(&mut FormNode, &dyn Model) + Send + Sync>;
pub type FormValidator = Arc<dyn Fn(&FormNode, &mut Errors) + Send + Sync>;

/// A declared form type.
pub struct FormType {
    name: String,
    model_name: String,
    declarations: Vec<AttributeDeclaration>,
    index: BTreeMap<String, usize>,
    before_validation: Option<BeforeValidationHook>,
    map_model: Option<MapModelHook>,
    validators: Vec<FormValidator>,
}

impl FormType {
    pub fn builder(name: impl Into<String>) -> FormTypeBuilder {
        FormTypeBuilder {
            name: name.into(),
            model_name: None,
            declarations: Vec::new(),
            inherited: Vec::new(),
            before_validation: None,
            map_model: None,
            validators: Vec::new(),
            error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key under which request params carry this form's fields.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Declarations in declaration order (inherited ones first).
    pub fn declarations(&self) -> &[AttributeDeclaration] {
        &self.declarations
    }

    pub fn declaration(&self, name: &str) -> Option<&AttributeDeclaration> {
        self.position(name).map(|i| &self.declarations[i])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn before_validation_hook(&self) -> Option<&BeforeValidationHook> {
        self.before_validation.as_ref()
    }

    pub fn map_model_hook(&self) -> Option<&MapModelHook> {
        self.map_model.as_ref()
    }

    pub fn validators(&self) -> &[FormValidator] {
        &self.validators
    }
}

impl fmt::Debug for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormType")
            .field("name", &self.name)
            .field("model_name", &self.model_name)
            .field("declarations", &self.declarations)
            .field("validators", &self.validators.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`FormType`]. Errors are deferred to [`build`](Self::build).
pub struct FormTypeBuilder {
    name: String,
    model_name: Option<String>,
    declarations: Vec<AttributeDeclaration>,
    inherited: Vec<String>,
    before_validation: Option<BeforeValidationHook>,
    map_model: Option<MapModelHook>,
    validators: Vec<FormValidator>,
    error: Option<SchemaError>,
}

impl FormTypeBuilder {
    /// Inherit every declaration, rule, hook and the model name of `parent`.
    ///
    /// Inherited attributes may be redeclared once locally; the local kind
    /// replaces the inherited one in place and inherited rules stay attached.
    pub fn extends(mut self, parent: &FormType) -> Self {
        self.declarations = parent.declarations.clone();
        self.inherited = parent.declarations.iter().map(|d| d.name.clone()).collect();
        if self.model_name.is_none() {
            self.model_name = Some(parent.model_name.clone());
        }
        self.before_validation = parent.before_validation.clone();
        self.map_model = parent.map_model.clone();
        self.validators = parent.validators.clone();
        self
    }

    /// Override the params key (mimic another model).
    pub fn model_name(mut self, name: impl AsRef<str>) -> Self {
        self.model_name = Some(canonical_key(name.as_ref()));
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        let name = name.into();
        if self.error.is_some() {
            return self;
        }
        if name == IDENTITY {
            self.error = Some(SchemaError::ReservedAttribute {
                form: self.name.clone(),
                name,
            });
            return self;
        }
        let canonical = canonical_key(&name);
        if canonical != name {
            self.error = Some(SchemaError::NonCanonicalAttribute {
                form: self.name.clone(),
                name,
                canonical,
            });
            return self;
        }

        let existing = self.declarations.iter().position(|d| d.name == name);
        match existing {
            Some(i) if self.inherited.contains(&name) => {
                self.inherited.retain(|n| n != &name);
                self.declarations[i].kind = kind;
            }
            Some(_) => {
                self.error = Some(SchemaError::DuplicateAttribute {
                    form: self.name.clone(),
                    name,
                });
            }
            None => self.declarations.push(AttributeDeclaration {
                name,
                kind,
                rules: Vec::new(),
            }),
        }
        self
    }

    pub fn scalar(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.attribute(name, AttributeKind::Scalar(scalar))
    }

    pub fn nested(self, name: impl Into<String>, form: &Arc<FormType>) -> Self {
        self.attribute(name, AttributeKind::NestedForm(Arc::clone(form)))
    }

    pub fn list(self, name: impl Into<String>, scalar: ScalarType) -> Self {
        self.attribute(name, AttributeKind::ArrayOfScalar(scalar))
    }

    pub fn collection(self, name: impl Into<String>, form: &Arc<FormType>) -> Self {
        self.attribute(name, AttributeKind::ArrayOfNestedForm(Arc::clone(form)))
    }

    /// Attach a rule to an already declared (or inherited) attribute.
    pub fn validates(mut self, name: &str, rule: Rule) -> Self {
        if self.error.is_some() {
            return self;
        }
        match self.declarations.iter_mut().find(|d| d.name == name) {
            Some(decl) => decl.rules.push(rule),
            None => {
                self.error = Some(SchemaError::InvalidRule {
                    form: self.name.clone(),
                    name: name.to_string(),
                    message: "rule targets an undeclared attribute".to_string(),
                });
            }
        }
        self
    }

    pub fn before_validation(mut self, hook: impl Fn(&mut FormNode) + Send + Sync + 'static) -> Self {
        self.before_validation = Some(Arc::new(hook));
        self
    }

    pub fn map_model(
        mut self,
        hook: impl Fn(&mut FormNode, &dyn Model) + Send + Sync + 'static,
    ) -> Self {
        self.map_model = Some(Arc::new(hook));
        self
    }

    /// Form-level validator; runs after attribute rules, before nested forms.
    pub fn validate_with(
        mut self,
        validator: impl Fn(&FormNode, &mut Errors) + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn build(self) -> Result<Arc<FormType>, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let model_name = self
            .model_name
            .unwrap_or_else(|| default_model_name(&self.name));
        let index = self
            .declarations
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        Ok(Arc::new(FormType {
            name: self.name,
            model_name,
            declarations: self.declarations,
            index,
            before_validation: self.before_validation,
            map_model: self.map_model,
            validators: self.validators,
        }))
    }
}

/// Form name without namespace and `Form` suffix, in canonical case:
/// `Inventory::ProductForm` -> `product`, `user_form` -> `user`.
fn default_model_name(form_name: &str) -> String {
    let key = canonical_key(form_name);
    let base = key.rsplit('/').next().unwrap_or(&key);
    match base.strip_suffix("_form") {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => base.to_string(),
    }
}
