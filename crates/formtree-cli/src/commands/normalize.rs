use crate::support::{
    load_registry_or_exit, parse_json_or_exit, print_json, read_payload_or_exit,
    require_form_or_exit,
};
use formtree_kernel::normalize;

pub fn run(schema: String, form: String, payload: String) {
    let registry = load_registry_or_exit(&schema);
    let form = require_form_or_exit(&registry, &form);
    let raw = parse_json_or_exit(&read_payload_or_exit(&payload), "payload");

    print_json(&normalize(&raw, &form));
}
