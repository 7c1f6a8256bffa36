//! First compile phase: sort the template root's children into plain
//! bindings and directive-bearing specials.

use crate::dom::{camelize, Document, NodeId};

/// A node carrying a `data-<prefix><name>` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Special {
    pub node: NodeId,
    /// Dataset key with the prefix removed, lower-cased.
    pub name: String,
    /// Attribute value; `None` when empty.
    pub action: Option<String>,
}

/// What one compile pass found, plus the nodes directives created.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub bindings: Vec<NodeId>,
    pub specials: Vec<Special>,
    /// Clones added by directives since the last clear.
    pub rendered: Vec<NodeId>,
}

impl Session {
    /// Forget what the previous discovery pass found. `rendered` is kept so
    /// the nodes can still be cleared.
    pub fn reset_discovery(&mut self) {
        self.bindings.clear();
        self.specials.clear();
    }
}

/// Classifies `nodes` (not their descendants) and appends the results to
/// `session`. A node is recorded as a binding once per plain data attribute.
pub fn discover(doc: &Document, nodes: &[NodeId], prefix: &str, session: &mut Session) {
    // dataset keys are camel-cased, so `my-app` must be compared as `myApp`
    let prefix = camelize(prefix);
    for &node in nodes {
        let Some(dataset) = doc.dataset(node) else {
            continue;
        };
        for (key, value) in dataset {
            match key.strip_prefix(prefix.as_str()) {
                Some(name) => session.specials.push(Special {
                    node,
                    name: name.to_lowercase(),
                    action: (!value.is_empty()).then(|| value.to_string()),
                }),
                None => session.bindings.push(node),
            }
        }
    }
}
