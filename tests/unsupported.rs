// Own test binary: the prefix is process-wide and fixed on first use.
use markup_bind::{set_prefix, Engine, MarkupError, Options};
use serde_json::json;

#[test]
fn test_unqueryable_prefix_is_environment_unsupported() {
    assert!(set_prefix("bad prefix"));
    let mut engine = Engine::parse(r#"<div data-mu-tmpl><p data-x></p></div>"#).unwrap();
    let err = engine.init(json!({"x": 1}), Options::new()).unwrap_err();
    assert!(matches!(err, MarkupError::EnvironmentUnsupported(_)), "{err}");
}
