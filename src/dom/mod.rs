//! Document tree on an [`indextree::Arena`].
//!
//! Every node lives in one arena and is addressed by [`NodeId`]. Removing a
//! node only detaches it, so ids held elsewhere (bindings, specials,
//! rendered clones) stay valid and can be re-attached.

pub mod html;
pub mod selector;

use indextree::Arena;
pub use indextree::NodeId;

use crate::errors::Result;
use selector::Selector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
    Doctype(String),
}

#[derive(Debug, Clone)]
pub struct Document {
    arena: Arena<NodeKind>,
    root: NodeId,
}

impl Document {
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeKind::Document);
        Self { arena, root }
    }

    /// Parse a complete document.
    pub fn parse(input: &str) -> Result<Self> {
        let mut doc = Document::new();
        let root = doc.root;
        html::parse_into(&mut doc, root, input)?;
        Ok(doc)
    }

    /// The document node every parsed tree hangs from.
    pub fn document_node(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeKind::Comment(text.into()))
    }

    pub fn create_doctype(&mut self, text: impl Into<String>) -> NodeId {
        self.arena.new_node(NodeKind::Doctype(text.into()))
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        self.arena[node].get()
    }

    pub(crate) fn kind_mut(&mut self, node: NodeId) -> &mut NodeKind {
        self.arena[node].get_mut()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Element { .. })
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].parent()
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.arena)
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.arena[node].last_child()
    }

    /// Whether `node` is reachable from the document node.
    pub fn is_attached(&self, node: NodeId) -> bool {
        node.ancestors(&self.arena).last() == Some(self.root)
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Detaches `node` from its parent. No-op for detached nodes.
    pub fn remove(&mut self, node: NodeId) {
        node.detach(&mut self.arena);
    }

    pub fn attributes(&self, node: NodeId) -> &[(String, String)] {
        match self.kind(node) {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets or replaces an attribute. Ignored on non-element nodes.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let NodeKind::Element { attrs, .. } = self.kind_mut(node) {
            let name = name.to_ascii_lowercase();
            let value = value.into();
            match attrs.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => attrs.push((name, value)),
            }
        }
    }

    /// The `data-*` attributes of an element keyed the way a DOM `dataset`
    /// keys them (`data-first-name` → `firstName`), in attribute order.
    /// `None` for nodes that have no dataset at all (text, comments).
    pub fn dataset(&self, node: NodeId) -> Option<Vec<(String, &str)>> {
        match self.kind(node) {
            NodeKind::Element { attrs, .. } => Some(
                attrs
                    .iter()
                    .filter_map(|(k, v)| {
                        k.strip_prefix("data-")
                            .map(|rest| (camelize(rest), v.as_str()))
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn has_data(&self, node: NodeId, key: &str) -> bool {
        self.dataset(node)
            .is_some_and(|set| set.iter().any(|(k, _)| k == key))
    }

    /// Copy of `node` with its attributes but none of its descendants.
    /// The copy starts out detached.
    pub fn clone_shallow(&mut self, node: NodeId) -> NodeId {
        let kind = self.kind(node).clone();
        self.arena.new_node(kind)
    }

    /// Detaches every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        let children: Vec<_> = self.children(node).collect();
        for child in children {
            child.detach(&mut self.arena);
        }
    }

    /// Replaces the children of `node` with `markup` parsed as a fragment.
    /// Markup that does not parse is inserted as a single text node.
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) {
        self.clear_children(node);
        if markup.is_empty() {
            return;
        }
        let holder = self.arena.new_node(NodeKind::Document);
        match html::parse_into(self, holder, markup) {
            Ok(()) => {
                let parsed: Vec<_> = self.children(holder).collect();
                for child in parsed {
                    self.append_child(node, child);
                }
            }
            Err(e) => {
                tracing::debug!(node = ?node, error = ?e, "content is not markup, inserting as text");
                let text = self.create_text(markup);
                self.append_child(node, text);
            }
        }
        holder.remove_subtree(&mut self.arena);
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            html::write_node(self, child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        html::write_node(self, node, &mut out);
        out
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|id| match self.kind(id) {
                NodeKind::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The whole attached tree serialized back to markup.
    pub fn to_html(&self) -> String {
        self.inner_html(self.root)
    }

    /// `node` and everything below it, in document order.
    pub fn descendants(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.descendants(&self.arena)
    }

    /// Attached elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(&selector))
    }

    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// `first-name` → `firstName`: a dash followed by a lowercase ASCII letter
/// becomes that letter upper-cased.
pub fn camelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('-', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}
