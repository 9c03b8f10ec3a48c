//! Error aggregation.
//!
//! [`Errors`] maps a path-qualified key to its ordered messages. Keys are
//! plain attribute names at the node that owns them, and gain a prefix
//! each time a child's errors are merged into its parent:
//!
//! ```text
//! name                 local rule on the node itself
//! address.street       nested form `address`
//! contacts.name        element of collection `contacts`
//! contacts[1].name     same, with index-qualified keys
//! ```
//!
//! Inserting a (key, message) pair that is already present is a no-op.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Errors {
    entries: BTreeMap<String, Vec<String>>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` under `key` unless that exact pair is present.
    ///
    /// Returns whether the message was inserted.
    pub fn merge(&mut self, key: impl Into<String>, message: impl Into<String>) -> bool {
        let message = message.into();
        let messages = self.entries.entry(key.into()).or_default();
        if messages.contains(&message) {
            return false;
        }
        messages.push(message);
        true
    }

    /// Merge every entry of `child` under `path`-qualified keys.
    pub fn merge_child(&mut self, path: ErrorPath<'_>, child: &Errors) {
        for (key, messages) in &child.entries {
            let qualified = path.qualify(key);
            for message in messages {
                self.merge(qualified.clone(), message.clone());
            }
        }
    }

    /// Messages under `key`; empty when the key has none.
    pub fn get(&self, key: &str) -> &[String] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `"<key> <message>"` lines, ordered by key then insertion.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(key, messages)| messages.iter().map(move |m| format!("{key} {m}")))
            .collect()
    }
}

/// Where a child node sits relative to the parent merging its errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPath<'a> {
    /// Nested form attribute, or collection element without index.
    Nested(&'a str),
    /// Collection element at a position.
    Indexed(&'a str, usize),
}

impl ErrorPath<'_> {
    pub fn qualify(&self, child_key: &str) -> String {
        match self {
            Self::Nested(attribute) => format!("{attribute}.{child_key}"),
            Self::Indexed(attribute, index) => format!("{attribute}[{index}].{child_key}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_deduplicates_and_keeps_order() {
        let mut errors = Errors::new();
        assert!(errors.merge("name", "can't be blank"));
        assert!(errors.merge("name", "is too short (minimum is 2 characters)"));
        assert!(!errors.merge("name", "can't be blank"));

        assert_eq!(
            errors.get("name"),
            ["can't be blank", "is too short (minimum is 2 characters)"]
        );
        assert_eq!(errors.len(), 1);
        assert!(errors.get("missing").is_empty());
    }

    #[test]
    fn child_errors_are_path_qualified() {
        let mut child = Errors::new();
        child.merge("name", "can't be blank");
        child.merge("phones.number", "can't be blank");

        let mut parent = Errors::new();
        parent.merge_child(ErrorPath::Nested("contact"), &child);
        parent.merge_child(ErrorPath::Indexed("contacts", 1), &child);

        assert!(parent.contains_key("contact.name"));
        assert!(parent.contains_key("contact.phones.number"));
        assert!(parent.contains_key("contacts[1].name"));
        assert!(parent.contains_key("contacts[1].phones.number"));
    }

    #[test]
    fn merging_the_same_child_twice_is_idempotent() {
        let mut child = Errors::new();
        child.merge("name", "can't be blank");

        let mut parent = Errors::new();
        parent.merge_child(ErrorPath::Nested("contacts"), &child);
        parent.merge_child(ErrorPath::Nested("contacts"), &child);
        assert_eq!(parent.get("contacts.name").len(), 1);
    }

    #[test]
    fn full_messages_render_key_and_message() {
        let mut errors = Errors::new();
        errors.merge("head.name", "can't be blank");
        errors.merge("email", "is invalid");
        insta::assert_snapshot!(errors.full_messages().join("\n"), @r"
        email is invalid
        head.name can't be blank
        ");
    }

    #[test]
    fn serializes_as_plain_object() {
        let mut errors = Errors::new();
        errors.merge("email", "is invalid");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({ "email": ["is invalid"] })
        );
    }
}
