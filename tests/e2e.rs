use markup_bind as mb;
use mb::{Engine, NodeId, Options};
use pretty_assertions::assert_eq;
use serde_json::json;

const LIST: &str = r#"<section data-mu-tmpl>
  <h2 data-title></h2>
  <ul data-mu-repeat="item in items">
    <li data-item></li>
  </ul>
</section>"#;

fn element_children(engine: &Engine, node: NodeId) -> Vec<NodeId> {
    let doc = engine.document();
    doc.children(node)
        .filter(|&n| doc.is_element(n))
        .collect()
}

fn repeat_node(engine: &Engine) -> NodeId {
    engine.document().query_selector_all("[data-mu-repeat]").unwrap()[0]
}

fn contents(engine: &Engine, node: NodeId) -> Vec<String> {
    element_children(engine, node)
        .into_iter()
        .map(|n| engine.document().inner_html(n))
        .collect()
}

#[test]
fn test_repeat_renders_one_node_per_item() {
    let mut engine = Engine::parse(LIST).unwrap();
    engine
        .init(json!({"title": "Letters", "items": ["a", "b", "c"]}), Options::new())
        .unwrap();

    let ul = repeat_node(&engine);
    assert_eq!(contents(&engine, ul), vec!["a", "b", "c"]);
    let h2 = engine.document().query_selector_all("h2").unwrap()[0];
    assert_eq!(engine.document().inner_html(h2), "Letters");
}

#[test]
fn test_plain_binding_receives_value() {
    let out = mb::render(
        r#"<div data-mu-tmpl><h1 data-title>placeholder</h1></div>"#,
        json!({"title": "Hello"}),
    )
    .unwrap();
    assert_eq!(out, r#"<div data-mu-tmpl=""><h1 data-title="">Hello</h1></div>"#);
}

#[test]
fn test_dashed_attributes_bind_camel_case_keys() {
    let out = mb::render(
        r#"<div data-mu-tmpl><span data-first-name></span></div>"#,
        json!({"firstName": "Ada", "first-name": "nope"}),
    )
    .unwrap();
    assert_eq!(out, r#"<div data-mu-tmpl=""><span data-first-name="">Ada</span></div>"#);
}

#[test]
fn test_values_are_inserted_as_markup() {
    let mut engine =
        Engine::parse(r#"<div data-mu-tmpl><p data-body></p></div>"#).unwrap();
    engine
        .init(json!({"body": "<strong>bold</strong> text"}), Options::new())
        .unwrap();
    let strong = engine.document().query_selector_all("strong").unwrap();
    assert_eq!(strong.len(), 1);
    assert_eq!(engine.document().text_content(strong[0]), "bold");
}

#[test]
fn test_compile_again_appends_more_clones() {
    let mut engine = Engine::parse(LIST).unwrap();
    engine
        .init(json!({"title": "t", "items": ["a", "b", "c"]}), Options::new())
        .unwrap();
    engine.compile().unwrap();

    let ul = repeat_node(&engine);
    assert_eq!(contents(&engine, ul), vec!["a", "b", "c", "b", "c"]);
    // discovery starts over on every compile
    assert_eq!(engine.bindings().len(), 1);
    assert_eq!(engine.specials().len(), 1);
}

#[test]
fn test_clear_then_compile_is_idempotent() {
    let mut engine = Engine::parse(LIST).unwrap();
    engine
        .init(json!({"title": "t", "items": ["a", "b", "c"]}), Options::new())
        .unwrap();
    let first = engine.document().to_html();

    engine.clear();
    engine.compile().unwrap();
    assert_eq!(engine.document().to_html(), first);
}

#[test]
fn test_changed_data_after_clear() {
    let mut engine = Engine::parse(LIST).unwrap();
    engine
        .init(json!({"title": "t", "items": ["a", "b", "c"]}), Options::new())
        .unwrap();
    engine.context().unwrap().set("items", json!(["x"]));
    engine.clear();
    engine.compile().unwrap();

    let ul = repeat_node(&engine);
    assert_eq!(contents(&engine, ul), vec!["x"]);
}

#[test]
fn test_repeat_as_the_only_child_expands() {
    let mut engine = Engine::parse(
        r#"<div data-mu-tmpl><ul data-mu-repeat="item in items"><li data-item></li></ul></div>"#,
    )
    .unwrap();
    engine
        .init(json!({"items": ["a", "b", "c"]}), Options::new())
        .unwrap();

    assert!(engine.bindings().is_empty());
    let ul = repeat_node(&engine);
    assert_eq!(contents(&engine, ul), vec!["a", "b", "c"]);
}

#[test]
fn test_directive_without_sibling_bindings_is_dispatched() {
    let html = r#"<div data-mu-tmpl><ul data-mu-repeat="item in items"><li data-item>?</li></ul></div>"#;
    let out = mb::render(html, json!({"items": [1, 2]})).unwrap();
    assert_eq!(
        out,
        r#"<div data-mu-tmpl=""><ul data-mu-repeat="item in items"><li data-item="">1</li><li data-item="">2</li></ul></div>"#
    );
}

#[test]
fn test_only_direct_children_are_bindings() {
    let out = mb::render(
        r#"<div data-mu-tmpl><p data-a></p><div><span data-a>deep</span></div></div>"#,
        json!({"a": "top"}),
    )
    .unwrap();
    assert_eq!(
        out,
        r#"<div data-mu-tmpl=""><p data-a="">top</p><div><span data-a="">deep</span></div></div>"#
    );
}

#[test]
fn test_unrecognized_settings_are_kept() {
    let mut engine = Engine::parse(LIST).unwrap();
    engine
        .init(
            json!({"title": "t", "items": []}),
            Options::from_json(json!({"theme": "dark"})).unwrap(),
        )
        .unwrap();
    assert_eq!(engine.settings().extra.get("theme"), Some(&json!("dark")));
    assert!(!engine.settings().throw_on_error);
}
