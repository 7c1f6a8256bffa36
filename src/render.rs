use itertools::Itertools;
use serde_json::Value;

use crate::context::{Context, Scope};
use crate::dom::{Document, NodeId};

/// Text written into a node for `value`. Strings go in as-is (no
/// escaping), arrays are joined with `,` and objects have no useful text.
pub fn to_markup(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => to_markup(other),
            })
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Writes every own key of `context` into each binding carrying a data
/// attribute of that name. Returns the number of writes.
pub fn render(doc: &mut Document, bindings: &[NodeId], context: &Context) -> usize {
    let keys = context.own_keys();
    let mut writes = 0;
    for &node in bindings.iter().unique() {
        for key in &keys {
            if !doc.has_data(node, key) {
                continue;
            }
            if let Some(value) = context.own(key) {
                doc.set_inner_html(node, &to_markup(&value));
                writes += 1;
            }
        }
    }
    tracing::trace!(bindings = bindings.len(), keys = keys.len(), writes, "render pass");
    writes
}
