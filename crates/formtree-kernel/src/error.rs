//! Error types for formtree kernel operations.
//!
//! Only programmer misuse is fatal. Coercion failures degrade to zero
//! values and validation failures are recorded in a node's [`Errors`]
//! map; neither ever shows up here.
//!
//! [`Errors`]: crate::errors::Errors

/// Fatal errors: contract violations at the call site.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Reading or writing a name that the form type never declared.
    #[error("unknown attribute `{name}` on form `{form}`")]
    UnknownAttribute { form: String, name: String },

    /// A value whose shape does not fit the declared attribute kind.
    #[error("attribute `{name}` on form `{form}` expects {expected}")]
    KindMismatch {
        form: String,
        name: String,
        expected: String,
    },

    /// Raw text handed to `from_json` is not a JSON document.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors raised while declaring or resolving form types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("form `{form}` declares attribute `{name}` more than once")]
    DuplicateAttribute { form: String, name: String },

    #[error("form `{form}` cannot declare reserved attribute `{name}`")]
    ReservedAttribute { form: String, name: String },

    /// Payload keys fold to snake_case before lookup, so only canonical
    /// names can ever bind.
    #[error("form `{form}` attribute `{name}` must be snake_case (`{canonical}`)")]
    NonCanonicalAttribute {
        form: String,
        name: String,
        canonical: String,
    },

    #[error("form type `{0}` is registered more than once")]
    DuplicateForm(String),

    #[error("form `{form}` references unknown form type `{reference}`")]
    UnknownFormType { form: String, reference: String },

    #[error("cyclic form references: {}", path.join(" -> "))]
    CyclicNesting { path: Vec<String> },

    #[error("form `{form}` attribute `{name}`: {message}")]
    InvalidRule {
        form: String,
        name: String,
        message: String,
    },

    #[error("schema parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_nesting_renders_path() {
        let err = SchemaError::CyclicNesting {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic form references: a -> b -> a");
    }

    #[test]
    fn schema_errors_convert_into_form_errors() {
        let err: FormError = SchemaError::DuplicateForm("user".into()).into();
        assert!(matches!(err, FormError::Schema(SchemaError::DuplicateForm(_))));
        assert_eq!(err.to_string(), "form type `user` is registered more than once");
    }
}
