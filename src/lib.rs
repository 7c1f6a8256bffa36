//! Declarative data binding for HTML documents.
//!
//! A template root marked with `data-mu-tmpl` is scanned for plain
//! `data-*` bindings and `data-mu-*` directives. Bindings receive the value
//! of the context key with the same (camel-cased) name; directives such as
//! `data-mu-repeat="item in items"` rewrite the tree first.
//!
//! ```rust
//! use serde_json::json;
//!
//! let html = markup_bind::render(
//!     r#"<div data-mu-tmpl><h1 data-title></h1><ul data-mu-repeat="item in items"><li data-item></li></ul></div>"#,
//!     json!({"title": "Fruit", "items": ["apple", "pear"]}),
//! )
//! .unwrap();
//! assert_eq!(
//!     html,
//!     r#"<div data-mu-tmpl=""><h1 data-title="">Fruit</h1><ul data-mu-repeat="item in items"><li data-item="">apple</li><li data-item="">pear</li></ul></div>"#
//! );
//! ```

pub mod context;
pub mod directives;
pub mod discovery;
pub mod dom;
pub mod engine;
pub mod errors;
pub mod parser;
pub mod render;
pub mod settings;

use serde_json::Value;

pub use context::{Context, Scope};
pub use directives::{directive_fn, Directive, DirectiveCx, Registry, Repeat, RepeatAction};
pub use discovery::Special;
pub use dom::{Document, NodeId, NodeKind};
pub use engine::{Engine, State};
pub use errors::{MarkupError, Result};
pub use settings::{prefix, set_prefix, Options, Settings};

/// Parse `template`, bind `data` with default options and return the
/// resulting markup.
pub fn render(template: &str, data: Value) -> Result<String> {
    let mut engine = Engine::parse(template)?;
    engine.init(data, Options::new())?;
    Ok(engine.into_document().to_html())
}
