//! `data-<prefix>-repeat="item in items"`: one copy of the item node per
//! array element.

use std::str::FromStr;

use serde_json::Value;

use super::{Directive, DirectiveCx};
use crate::context::Scope;
use crate::discovery::Special;
use crate::errors::{MarkupError, Result};
use crate::parser::{ParseError, Parser};
use crate::render::to_markup;
use crate::settings::prefix;

/// Parsed `<item> in <array>` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatAction {
    pub item: String,
    pub array: String,
}

impl RepeatAction {
    pub fn parse(action: &str) -> std::result::Result<Self, ParseError> {
        let mut p = Parser::new(action);
        p.skip_ws();
        let item = p.parse_identifier()?;
        if !p.skip_ws() || !p.consume_str("in") || !p.skip_ws() {
            return Err(ParseError::InvalidSyntax(format!(
                "expected ` in ` after `{item}`"
            )));
        }
        let array = p.parse_identifier()?;
        p.skip_ws();
        if !p.eof() {
            return Err(ParseError::InvalidSyntax(format!(
                "trailing input after `{array}`"
            )));
        }
        Ok(Self { item, array })
    }
}

impl FromStr for RepeatAction {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The built-in `repeat` directive.
pub struct Repeat;

impl Directive for Repeat {
    fn name(&self) -> &str {
        "repeat"
    }

    fn apply(&self, special: &Special, cx: &mut DirectiveCx<'_>) -> Result<()> {
        let elem = special.node;
        let action = match special.action.as_deref().map(RepeatAction::parse) {
            Some(Ok(action)) => action,
            failed => {
                tracing::warn!(node = ?elem, "element removed from document");
                cx.doc.remove(elem);
                let detail = match failed {
                    Some(Err(ParseError::InvalidSyntax(msg))) => msg,
                    _ => "no action given".to_string(),
                };
                return Err(MarkupError::DirectiveSyntax(format!(
                    "data-{}-repeat actions must be formatted as `{{itemName}} in {{arrayName}}`: {detail}",
                    prefix()
                )));
            }
        };

        let items = match cx.context.own(&action.array) {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(MarkupError::DirectiveData(format!(
                    "`{}` is not an array, repeat only supports arrays",
                    action.array
                )))
            }
            None => {
                return Err(MarkupError::DirectiveData(format!(
                    "`{}` was not found in context",
                    action.array
                )))
            }
        };

        let template = cx
            .doc
            .children(elem)
            .find(|&n| cx.doc.has_data(n, &action.item))
            .ok_or_else(|| {
                MarkupError::DirectiveData(format!(
                    "no child of the repeat element binds `{}`",
                    action.item
                ))
            })?;

        tracing::debug!(node = ?elem, item = %action.item, array = %action.array, len = items.len(), "repeat");

        let Some((first, rest)) = items.split_first() else {
            // nothing to show: keep the template item, empty
            cx.doc.set_inner_html(template, "");
            return Ok(());
        };
        cx.doc.set_inner_html(template, &to_markup(first));
        for item in rest {
            let clone = cx.doc.clone_shallow(template);
            cx.doc.set_inner_html(clone, &to_markup(item));
            cx.doc.append_child(elem, clone);
            cx.record_rendered(clone);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::dom::Document;
    use crate::settings::Settings;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_item_in_array() {
        assert_eq!(
            RepeatAction::parse("  item   in\titems ").unwrap(),
            RepeatAction { item: "item".into(), array: "items".into() }
        );
        assert_eq!("x in y".parse::<RepeatAction>().unwrap().array, "y");
    }

    #[test]
    fn rejects_malformed_actions() {
        for bad in ["item", "item of items", "item in", "iteminitems", "item initems", "a in b c", ""] {
            assert!(RepeatAction::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    fn setup(html: &str) -> (Document, Special) {
        let doc = Document::parse(html).unwrap();
        let ul = doc.query_selector_all("ul").unwrap()[0];
        let action = doc.attr(ul, "data-mu-repeat").map(str::to_string);
        (doc, Special { node: ul, name: "repeat".into(), action })
    }

    fn run(doc: &mut Document, special: &Special, data: serde_json::Value) -> (Result<()>, Vec<crate::dom::NodeId>) {
        let context = Context::new();
        if let Value::Object(map) = data {
            context.extend(map);
        }
        let settings = Settings::default();
        let mut rendered = Vec::new();
        let mut cx = DirectiveCx::new(doc, &context, &settings, &mut rendered);
        let res = Repeat.apply(special, &mut cx);
        (res, rendered)
    }

    #[test]
    fn clones_item_per_element_in_order() {
        let (mut doc, special) =
            setup(r#"<ul data-mu-repeat="n in nums"><li class="row" data-n>?</li></ul>"#);
        let (res, rendered) = run(&mut doc, &special, json!({"nums": [1, "two", true]}));
        res.unwrap();
        assert_eq!(rendered.len(), 2);
        assert_eq!(
            doc.to_html(),
            r#"<ul data-mu-repeat="n in nums"><li class="row" data-n="">1</li><li class="row" data-n="">two</li><li class="row" data-n="">true</li></ul>"#
        );
    }

    #[test]
    fn single_element_writes_in_place() {
        let (mut doc, special) = setup(r#"<ul data-mu-repeat="n in nums"><li data-n>?</li></ul>"#);
        let (res, rendered) = run(&mut doc, &special, json!({"nums": ["only"]}));
        res.unwrap();
        assert!(rendered.is_empty());
        assert_eq!(doc.text_content(special.node), "only");
    }

    #[test]
    fn empty_array_clears_the_item() {
        let (mut doc, special) = setup(r#"<ul data-mu-repeat="n in nums"><li data-n>?</li></ul>"#);
        run(&mut doc, &special, json!({"nums": []})).0.unwrap();
        assert_eq!(doc.to_html(), r#"<ul data-mu-repeat="n in nums"><li data-n=""></li></ul>"#);
    }

    #[test]
    fn only_the_first_matching_child_is_the_template() {
        let (mut doc, special) =
            setup(r#"<ul data-mu-repeat="n in nums"><li>head</li><li data-n>a</li><li data-n>b</li></ul>"#);
        run(&mut doc, &special, json!({"nums": [1, 2]})).0.unwrap();
        assert_eq!(
            doc.inner_html(special.node),
            r#"<li>head</li><li data-n="">1</li><li data-n="">b</li><li data-n="">2</li>"#
        );
    }

    #[test]
    fn bad_syntax_removes_the_node() {
        let (mut doc, special) = setup(r#"<div><ul data-mu-repeat="nums"><li data-n></li></ul></div>"#);
        let err = run(&mut doc, &special, json!({"nums": [1]})).0.unwrap_err();
        assert!(matches!(err, MarkupError::DirectiveSyntax(_)));
        assert_eq!(doc.to_html(), "<div></div>");
    }

    #[test]
    fn missing_or_non_array_data_leaves_document_alone() {
        let html = r#"<ul data-mu-repeat="n in nums"><li data-n>?</li></ul>"#;
        for data in [json!({}), json!({"nums": "abc"}), json!({"nums": {"a": 1}})] {
            let (mut doc, special) = setup(html);
            let err = run(&mut doc, &special, data).0.unwrap_err();
            assert!(matches!(err, MarkupError::DirectiveData(_)));
            assert_eq!(doc.to_html(), r#"<ul data-mu-repeat="n in nums"><li data-n="">?</li></ul>"#);
        }
    }

    #[test]
    fn missing_template_item_is_a_data_error() {
        let (mut doc, special) = setup(r#"<ul data-mu-repeat="n in nums"><li data-m>?</li></ul>"#);
        let err = run(&mut doc, &special, json!({"nums": [1]})).0.unwrap_err();
        assert!(matches!(err, MarkupError::DirectiveData(_)));
    }
}
