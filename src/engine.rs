use serde_json::Value;

use crate::context::{Context, Scope};
use crate::directives::{DirectiveCx, Registry};
use crate::discovery::{self, Session, Special};
use crate::dom::selector::Selector;
use crate::dom::{Document, NodeId};
use crate::errors::{MarkupError, Result};
use crate::render;
use crate::settings::{prefix, Options, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Initialized,
    Compiled,
}

/// Binds data into one document.
///
/// ```rust
/// use markup_bind::{Engine, Options};
/// use serde_json::json;
///
/// let mut engine = Engine::parse(r#"<main data-mu-tmpl><h1 data-title></h1></main>"#).unwrap();
/// engine.init(json!({"title": "Hello"}), Options::new()).unwrap();
/// assert_eq!(
///     engine.document().to_html(),
///     r#"<main data-mu-tmpl=""><h1 data-title="">Hello</h1></main>"#
/// );
/// ```
#[derive(Debug)]
pub struct Engine {
    document: Document,
    root_context: Context,
    context: Option<Context>,
    registry: Registry,
    settings: Settings,
    root: Option<NodeId>,
    session: Session,
    state: State,
}

impl Engine {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            root_context: Context::new(),
            context: None,
            registry: Registry::with_builtins(),
            settings: Settings::default(),
            root: None,
            session: Session::default(),
            state: State::Uninitialized,
        }
    }

    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self::new(Document::parse(html)?))
    }

    /// Registers `options`' directives, merges its settings, binds `data`
    /// into a fresh working context and compiles the single template root.
    pub fn init(&mut self, data: Value, options: Options) -> Result<()> {
        let (specials, settings) = options.into_parts();
        for directive in specials {
            self.registry.register_arc(directive);
        }
        self.settings.merge(settings)?;

        let prefix = prefix();
        let selector = Selector::has_attribute(&format!("data-{prefix}-tmpl")).map_err(|e| {
            MarkupError::EnvironmentUnsupported(format!(
                "the document cannot be queried for templates with prefix `{prefix}`: {e:?}"
            ))
        })?;

        let context = self.root_context.branch(false);
        match data {
            Value::Object(map) => context.extend(map),
            Value::Null => {}
            other => {
                return Err(MarkupError::Configuration(format!(
                    "init data must be a JSON object, got {other}"
                )))
            }
        }

        let root = match self.document.select(&selector).as_slice() {
            [] => {
                return Err(MarkupError::Configuration(format!(
                    "templates require a `data-{prefix}-tmpl` attribute on the root node"
                )))
            }
            [root] => *root,
            more => {
                return Err(MarkupError::Configuration(format!(
                    "templates currently only support one root node, found {}",
                    more.len()
                )))
            }
        };
        if self.document.children(root).next().is_none() {
            return Err(MarkupError::Configuration(
                "no markup bindings present within root node".into(),
            ));
        }

        tracing::debug!(root = ?root, context = context.id(), "initialized");
        self.root = Some(root);
        self.context = Some(context);
        self.state = State::Initialized;
        self.compile()
    }

    /// Discovery, directive dispatch, then render. Bindings and specials
    /// from an earlier pass are dropped first.
    pub fn compile(&mut self) -> Result<()> {
        let (Some(root), Some(context)) = (self.root, self.context.clone()) else {
            return Err(MarkupError::UninitializedUse);
        };

        self.session.reset_discovery();
        let children: Vec<_> = self.document.children(root).collect();
        discovery::discover(&self.document, &children, prefix(), &mut self.session);
        tracing::debug!(
            bindings = self.session.bindings.len(),
            specials = self.session.specials.len(),
            "discovery"
        );

        if !self.session.specials.is_empty() {
            let mut cx = DirectiveCx::new(
                &mut self.document,
                &context,
                &self.settings,
                &mut self.session.rendered,
            );
            self.registry.dispatch(&self.session.specials, &mut cx)?;
        }
        if !self.session.bindings.is_empty() {
            render::render(&mut self.document, &self.session.bindings, &context);
        }
        self.state = State::Compiled;
        Ok(())
    }

    /// Re-applies the working context to the bindings found by the last
    /// compile. Directives are not re-run.
    pub fn render(&mut self) -> Result<()> {
        match (&self.context, self.state) {
            (Some(context), State::Compiled) => {
                render::render(&mut self.document, &self.session.bindings, context);
                Ok(())
            }
            _ => Err(MarkupError::UninitializedUse),
        }
    }

    /// Removes every node directives generated, so the next `compile()`
    /// starts from the bare template instead of appending to it.
    pub fn clear(&mut self) {
        for node in self.session.rendered.drain(..) {
            self.document.remove(node);
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    /// The working context of the last successful `init`.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn root_context(&self) -> &Context {
        &self.root_context
    }

    pub fn template_root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn bindings(&self) -> &[NodeId] {
        &self.session.bindings
    }

    pub fn specials(&self) -> &[Special] {
        &self.session.specials
    }
}
