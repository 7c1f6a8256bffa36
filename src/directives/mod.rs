use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::discovery::Special;
use crate::dom::{Document, NodeId};
use crate::errors::Result;
use crate::settings::Settings;

pub mod repeat;

pub use repeat::{Repeat, RepeatAction};

/// What a directive handler gets to work with.
pub struct DirectiveCx<'a> {
    pub doc: &'a mut Document,
    pub context: &'a Context,
    pub settings: &'a Settings,
    rendered: &'a mut Vec<NodeId>,
}

impl<'a> DirectiveCx<'a> {
    pub fn new(
        doc: &'a mut Document,
        context: &'a Context,
        settings: &'a Settings,
        rendered: &'a mut Vec<NodeId>,
    ) -> Self {
        Self { doc, context, settings, rendered }
    }

    /// Marks `node` as generated so `Engine::clear` can take it out again.
    pub fn record_rendered(&mut self, node: NodeId) {
        self.rendered.push(node);
    }
}

/// Handler for one `data-<prefix>-<name>` attribute.
pub trait Directive: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, special: &Special, cx: &mut DirectiveCx<'_>) -> Result<()>;
}

/// A directive backed by a closure.
pub struct FnDirective<F> {
    name: String,
    f: F,
}

pub fn directive_fn<F>(name: impl Into<String>, f: F) -> FnDirective<F>
where
    F: Fn(&Special, &mut DirectiveCx<'_>) -> Result<()> + Send + Sync,
{
    FnDirective { name: name.into(), f }
}

impl<F> Directive for FnDirective<F>
where
    F: Fn(&Special, &mut DirectiveCx<'_>) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, special: &Special, cx: &mut DirectiveCx<'_>) -> Result<()> {
        (self.f)(special, cx)
    }
}

/// Directive name → handler. Names are stored lower-cased because
/// discovered names always are.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Arc<dyn Directive>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Repeat);
        registry
    }

    pub fn register<D: Directive + 'static>(&mut self, d: D) {
        self.register_arc(Arc::new(d));
    }

    /// Adds or replaces the handler for `d.name()`.
    pub fn register_arc(&mut self, d: Arc<dyn Directive>) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(d.name().to_lowercase(), d);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Directive>> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the registered handler of every special, in order. Unknown
    /// names are skipped. Directive syntax/data errors are logged and
    /// skipped unless `throwOnError` is set; other errors always return.
    pub fn dispatch(&self, specials: &[Special], cx: &mut DirectiveCx<'_>) -> Result<()> {
        for special in specials {
            let Some(directive) = self.get(&special.name) else {
                tracing::trace!(name = %special.name, node = ?special.node, "no directive registered");
                continue;
            };
            match directive.apply(special, cx) {
                Ok(()) => {}
                Err(e) if e.is_policy_gated() && !cx.settings.throw_on_error => {
                    tracing::error!(directive = %special.name, node = ?special.node, "{e}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("names", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MarkupError;
    use pretty_assertions::assert_eq;

    fn special(doc: &mut Document, name: &str) -> Special {
        Special {
            node: doc.create_element("div"),
            name: name.into(),
            action: None,
        }
    }

    #[test]
    fn builtins_contain_repeat() {
        assert_eq!(Registry::with_builtins().names(), vec!["repeat"]);
    }

    #[test]
    fn register_lower_cases_and_overrides() {
        let mut r = Registry::with_builtins();
        r.register(directive_fn("Repeat", |_, _| Ok(())));
        r.register(directive_fn("Show", |_, _| Ok(())));
        assert_eq!(r.names(), vec!["repeat", "show"]);
        assert_eq!(r.get("repeat").unwrap().name(), "Repeat");
    }

    #[test]
    fn dispatch_skips_unknown_and_gates_errors() {
        let mut r = Registry::new();
        r.register(directive_fn("bad", |_, _| {
            Err(MarkupError::DirectiveData("boom".into()))
        }));
        r.register(directive_fn("mark", |s, cx| {
            cx.doc.set_attr(s.node, "data-done", "1");
            Ok(())
        }));

        let mut doc = Document::new();
        let specials = vec![special(&mut doc, "nope"), special(&mut doc, "bad"), special(&mut doc, "mark")];
        let context = Context::new();
        let mut rendered = Vec::new();

        let lenient = Settings::default();
        let mut cx = DirectiveCx::new(&mut doc, &context, &lenient, &mut rendered);
        r.dispatch(&specials, &mut cx).unwrap();
        assert_eq!(doc.attr(specials[2].node, "data-done"), Some("1"));

        let strict = Settings { throw_on_error: true, ..Settings::default() };
        let mut cx = DirectiveCx::new(&mut doc, &context, &strict, &mut rendered);
        let err = r.dispatch(&specials, &mut cx).unwrap_err();
        assert!(matches!(err, MarkupError::DirectiveData(_)));
    }

    #[test]
    fn ungated_errors_always_propagate() {
        let mut r = Registry::new();
        r.register(directive_fn("bad", |_, _| Err(MarkupError::UninitializedUse)));
        let mut doc = Document::new();
        let specials = vec![special(&mut doc, "bad")];
        let context = Context::new();
        let settings = Settings::default();
        let mut rendered = Vec::new();
        let mut cx = DirectiveCx::new(&mut doc, &context, &settings, &mut rendered);
        assert!(r.dispatch(&specials, &mut cx).is_err());
    }
}
