use formtree_kernel::{FormType, SchemaDocument, SchemaRegistry};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Validation ran and the tree is invalid.
pub const EXIT_INVALID: i32 = 1;
/// Bad arguments, unreadable input or a schema that does not resolve.
pub const EXIT_USAGE: i32 = 2;

pub fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_USAGE);
}

pub fn load_registry_or_exit(schema_arg: &str) -> SchemaRegistry {
    let path = Path::new(schema_arg);
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("failed to read {}: {e}", path.display())));

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let document = if is_json {
        SchemaDocument::from_json_str(&text)
    } else {
        SchemaDocument::from_toml_str(&text)
    }
    .unwrap_or_else(|e| fail(format!("failed to load {}: {e}", path.display())));

    SchemaRegistry::from_document(&document)
        .unwrap_or_else(|e| fail(format!("invalid schema {}: {e}", path.display())))
}

pub fn require_form_or_exit(registry: &SchemaRegistry, name: &str) -> Arc<FormType> {
    match registry.get(name) {
        Some(form) => Arc::clone(form),
        None => {
            let known: Vec<&str> = registry.iter().map(|f| f.name()).collect();
            fail(format!(
                "unknown form `{name}`; declared forms: {}",
                known.join(", ")
            ))
        }
    }
}

/// Payload file contents; `-` reads stdin.
pub fn read_payload_or_exit(payload_arg: &str) -> String {
    if payload_arg == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .unwrap_or_else(|e| fail(format!("failed to read stdin: {e}")));
        return text;
    }
    fs::read_to_string(payload_arg)
        .unwrap_or_else(|e| fail(format!("failed to read {payload_arg}: {e}")))
}

pub fn parse_json_or_exit(text: &str, what: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|e| fail(format!("invalid {what} JSON: {e}")))
}

/// `key=value` pairs. Values parse as JSON when they can (`10`, `true`,
/// `{"a":1}`) and are taken as plain strings otherwise.
pub fn parse_extras_or_exit(pairs: &[String]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|pair| match parse_extra(pair) {
            Some(entry) => entry,
            None => fail(format!("invalid --extra `{pair}`; expected KEY=VALUE")),
        })
        .collect()
}

fn parse_extra(pair: &str) -> Option<(String, Value)> {
    let (key, raw) = pair.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Some((key.to_string(), value))
}

pub fn print_json(value: &Value) {
    let text = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| fail(format!("json serialization: {e}")));
    println!("{text}");
}
