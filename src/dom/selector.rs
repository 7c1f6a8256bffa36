//! Attribute/tag selectors: `tag`, `[attr]`, `[attr="v"]`, `tag[attr]` and
//! comma-separated lists of those.

use super::{Document, NodeId};
use crate::parser::{ParseError, Parser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut p = Parser::new(input);
        let mut alternatives = Vec::new();
        loop {
            p.skip_ws();
            alternatives.push(parse_compound(&mut p)?);
            p.skip_ws();
            if p.consume_char(',') {
                continue;
            }
            if !p.eof() {
                return Err(ParseError::InvalidSyntax(format!(
                    "unexpected input in selector `{input}` at offset {}",
                    p.pos()
                )));
            }
            return Ok(Self { alternatives });
        }
    }

    /// Convenience for `[name]`.
    pub fn has_attribute(name: &str) -> Result<Self, ParseError> {
        Self::parse(&format!("[{name}]"))
    }

    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        self.alternatives.iter().any(|c| {
            c.tag.as_deref().map_or(true, |t| t == "*" || t == tag)
                && c.attrs.iter().all(|a| match doc.attr(node, &a.name) {
                    Some(v) => a.value.as_deref().map_or(true, |want| want == v),
                    None => false,
                })
        })
    }
}

fn parse_compound(p: &mut Parser<'_>) -> Result<Compound, ParseError> {
    let tag = if p.consume_char('*') {
        Some("*".to_string())
    } else if p.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
        Some(p.parse_name()?.to_ascii_lowercase())
    } else {
        None
    };
    let mut attrs = Vec::new();
    while p.consume_char('[') {
        p.skip_ws();
        let name = p.parse_name()?.to_ascii_lowercase();
        p.skip_ws();
        let value = if p.consume_char('=') {
            p.skip_ws();
            let v = match p.peek_char() {
                Some('"' | '\'') => p.parse_quoted_string()?,
                _ => p.parse_name()?.to_string(),
            };
            p.skip_ws();
            Some(v)
        } else {
            None
        };
        p.expect(']')?;
        attrs.push(AttrMatch { name, value });
    }
    if tag.is_none() && attrs.is_empty() {
        return Err(ParseError::InvalidSyntax(format!(
            "empty selector at offset {}",
            p.pos()
        )));
    }
    Ok(Compound { tag, attrs })
}
