use crate::cli::Source;
use crate::support::{
    EXIT_INVALID, fail, load_registry_or_exit, parse_extras_or_exit, parse_json_or_exit,
    print_json, read_payload_or_exit, require_form_or_exit,
};
use formtree_kernel::{FormNode, ValidationOptions, normalize};
use serde_json::json;
use tracing::warn;

pub struct Args {
    pub schema: String,
    pub form: String,
    pub payload: String,
    pub source: Source,
    pub extra: Vec<String>,
    pub index_errors: bool,
    pub skip_nested: bool,
    pub skip_arrays: bool,
    pub context: Option<String>,
    pub json: bool,
}

pub fn run(args: Args) {
    let registry = load_registry_or_exit(&args.schema);
    let form = require_form_or_exit(&registry, &args.form);
    let text = read_payload_or_exit(&args.payload);
    let extras = parse_extras_or_exit(&args.extra);

    if !extras.is_empty() && matches!(args.source, Source::Json | Source::Model) {
        warn!(source = ?args.source, "--extra only applies to payload and params sources");
    }

    let mut node = match args.source {
        Source::Payload => {
            let raw = parse_json_or_exit(&text, "payload");
            FormNode::from_payload(&form, &normalize(&raw, &form), &extras)
        }
        Source::Params => {
            let raw = parse_json_or_exit(&text, "params");
            FormNode::from_params(&form, &raw, &extras)
        }
        Source::Json => FormNode::from_json(&form, &text).unwrap_or_else(|e| fail(e)),
        Source::Model => {
            let raw = parse_json_or_exit(&text, "model");
            FormNode::from_model(&form, &raw)
        }
    };

    let mut options: ValidationOptions = registry.defaults().clone();
    options.index_errors |= args.index_errors;
    options.skip_nested |= args.skip_nested;
    options.skip_arrays |= args.skip_arrays;
    if let Some(context) = &args.context {
        options.context = Some(parse_json_or_exit(context, "context"));
    }

    let valid = node.valid(&options);
    let full_messages = node.errors().full_messages();

    if args.json {
        print_json(&json!({
            "form": form.name(),
            "model_name": form.model_name(),
            "id": node.id(),
            "persisted": node.persisted(),
            "valid": valid,
            "attributes": node.to_json(),
            "errors": node.errors(),
            "full_messages": full_messages,
        }));
    } else {
        println!("formtree check --form {}", form.name());
        println!("  Source: {}", args.payload);
        if let Some(id) = node.id() {
            println!("  Id: {id}");
        }
        println!("  Valid: {}", if valid { "yes" } else { "no" });
        if !full_messages.is_empty() {
            println!("  Errors:");
            for message in &full_messages {
                println!("    - {message}");
            }
        }
    }

    if !valid {
        std::process::exit(EXIT_INVALID);
    }
}
