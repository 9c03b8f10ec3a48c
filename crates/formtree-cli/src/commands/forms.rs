use crate::support::{load_registry_or_exit, print_json};
use formtree_kernel::{AttributeDeclaration, FormType};
use serde_json::{Value, json};

pub fn run(schema: String, json_output: bool) {
    let registry = load_registry_or_exit(&schema);

    if json_output {
        let forms: Vec<Value> = registry.iter().map(|form| describe(form)).collect();
        print_json(&json!({
            "schema": schema,
            "form_count": registry.len(),
            "defaults": registry.defaults(),
            "forms": forms,
        }));
        return;
    }

    println!("formtree forms --schema {schema}");
    println!("  Forms: {}", registry.len());
    for form in registry.iter() {
        println!("  {} (params key: {})", form.name(), form.model_name());
        for decl in form.declarations() {
            println!("    - {}", render_declaration(decl));
        }
    }
}

fn describe(form: &FormType) -> Value {
    let attributes: Vec<Value> = form
        .declarations()
        .iter()
        .map(|decl| {
            json!({
                "name": decl.name(),
                "kind": decl.kind().to_string(),
                "rules": decl.rules().iter().map(|r| r.name()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "name": form.name(),
        "model_name": form.model_name(),
        "attributes": attributes,
    })
}

fn render_declaration(decl: &AttributeDeclaration) -> String {
    let rules: Vec<&str> = decl.rules().iter().map(|r| r.name()).collect();
    if rules.is_empty() {
        format!("{}: {}", decl.name(), decl.kind())
    } else {
        format!("{}: {} [{}]", decl.name(), decl.kind(), rules.join(", "))
    }
}
