//! HTML reader on top of the `html5gum` tokenizer, and the matching writer.
//!
//! The tokenizer does the lexing (attribute forms, character references,
//! comments, doctype, raw text). Tree building stays lenient: void and
//! self-closing elements close at once, stray end tags are dropped and
//! whatever is still open at end of input is closed. Input that ends in the
//! middle of a tag, comment or doctype is rejected.

use html5gum::{Error, Spanned, State, Token, Tokenizer};

use super::{Document, NodeId, NodeKind};
use crate::parser::ParseError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses `input` and appends the resulting nodes to `parent`.
pub(crate) fn parse_into(doc: &mut Document, parent: NodeId, input: &str) -> Result<(), ParseError> {
    let mut tokenizer = Tokenizer::new(input);
    // stack[0] is the container and is never popped
    let mut stack = vec![parent];

    while let Some(token) = tokenizer.next() {
        let token = token.map_err(|e| ParseError::InvalidSyntax(format!("{e:?}")))?;
        let top = stack.last().copied().unwrap_or(parent);

        match token {
            Token::StartTag(tag) => {
                let name = lossy(&tag.name).to_ascii_lowercase();
                let el = doc.create_element(&name);
                for (key, value) in tag.attributes.iter() {
                    doc.set_attr(el, &lossy(key), lossy(value));
                }
                doc.append_child(top, el);

                if !tag.self_closing && !is_void(&name) {
                    match name.as_str() {
                        "script" | "style" => tokenizer.set_state(State::ScriptData),
                        "textarea" | "title" => tokenizer.set_state(State::RcData),
                        _ => {}
                    }
                    stack.push(el);
                }
            }
            Token::EndTag(tag) => {
                let name = lossy(&tag.name).to_ascii_lowercase();
                if let Some(pos) = stack
                    .iter()
                    .skip(1)
                    .rposition(|&n| doc.tag(n) == Some(name.as_str()))
                {
                    stack.truncate(pos + 1);
                }
            }
            Token::String(text) => push_text(doc, top, &lossy(&text)),
            Token::Comment(text) => {
                let node = doc.create_comment(lossy(&text));
                doc.append_child(top, node);
            }
            Token::Doctype(doctype) => {
                let node = doc.create_doctype(lossy(&doctype.name));
                doc.append_child(top, node);
            }
            Token::Error(Spanned {
                value: e @ (Error::EofInTag | Error::EofInComment | Error::EofInDoctype),
                ..
            }) => {
                return Err(ParseError::InvalidSyntax(format!("unterminated markup: {e:?}")));
            }
            Token::Error(e) => tracing::trace!(error = ?e, "recovered from markup error"),
        }
    }
    Ok(())
}

/// Appends text, merging with a trailing text node.
fn push_text(doc: &mut Document, parent: NodeId, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = doc.last_child(parent) {
        if let NodeKind::Text(existing) = doc.kind_mut(last) {
            existing.push_str(text);
            return;
        }
    }
    let node = doc.create_text(text);
    doc.append_child(parent, node);
}

pub(crate) fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        NodeKind::Document => {
            for child in doc.children(node) {
                write_node(doc, child, out);
            }
        }
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (k, v) in attrs {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                escape(v, true, out);
                out.push('"');
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            for child in doc.children(node) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Text(t) => {
            let raw = doc
                .parent(node)
                .and_then(|p| doc.tag(p))
                .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
            if raw {
                out.push_str(t);
            } else {
                escape(t, false, out);
            }
        }
        NodeKind::Comment(c) => {
            out.push_str("<!--");
            out.push_str(c);
            out.push_str("-->");
        }
        NodeKind::Doctype(d) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(d);
            out.push('>');
        }
    }
}

fn escape(v: &str, attribute: bool, out: &mut String) {
    for c in v.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
