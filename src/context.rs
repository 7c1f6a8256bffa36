//! Hierarchical data scopes.
//!
//! A [`Context`] holds JSON values by key. Branching produces a child scope
//! that either falls back to the keys of the context it was branched from
//! (including keys added there later) or, when isolated, starts empty and
//! only keeps the shared `root` reference.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Key lookup and branching over a chain of scopes.
pub trait Scope: Sized {
    /// Own value first, then the prototype chain.
    fn get(&self, key: &str) -> Option<Value>;
    /// Own value only.
    fn own(&self, key: &str) -> Option<Value>;
    fn branch(&self, isolate: bool) -> Self;
}

struct Inner {
    id: usize,
    /// `None` on the root context itself.
    root: Option<Context>,
    parent: Option<Context>,
    /// Lookup fallback. Every non-isolated child of a context points at
    /// that same context, so siblings share one prototype.
    proto: Option<Context>,
    isolated: bool,
    data: RefCell<Map<String, Value>>,
}

/// Cheaply clonable handle to a scope. Clones refer to the same scope.
#[derive(Clone)]
pub struct Context(Rc<Inner>);

impl Context {
    /// A fresh root context.
    pub fn new() -> Self {
        Context(Rc::new(Inner {
            id: next_id(),
            root: None,
            parent: None,
            proto: None,
            isolated: false,
            data: RefCell::new(Map::new()),
        }))
    }

    /// Branch with `parent` overriding the recorded parent. Lookups still
    /// fall back to `self`, not to `parent`.
    pub fn branch_with_parent(&self, isolate: bool, parent: Option<&Context>) -> Context {
        let parent = parent.unwrap_or(self).clone();
        Context(Rc::new(Inner {
            id: next_id(),
            root: Some(self.root()),
            parent: Some(parent),
            proto: (!isolate).then(|| self.clone()),
            isolated: isolate,
            data: RefCell::new(Map::new()),
        }))
    }

    pub fn id(&self) -> usize {
        self.0.id
    }

    pub fn root(&self) -> Context {
        match &self.0.root {
            Some(root) => root.clone(),
            None => self.clone(),
        }
    }

    pub fn parent(&self) -> Option<&Context> {
        self.0.parent.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.0.root.is_none()
    }

    pub fn is_isolated(&self) -> bool {
        self.0.isolated
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0.data.borrow_mut().insert(key.into(), value);
    }

    /// Merges `data` into the own keys, overwriting existing ones.
    pub fn extend(&self, data: Map<String, Value>) {
        self.0.data.borrow_mut().extend(data);
    }

    pub fn has_own(&self, key: &str) -> bool {
        self.0.data.borrow().contains_key(key)
    }

    pub fn own_keys(&self) -> Vec<String> {
        self.0.data.borrow().keys().cloned().collect()
    }

    /// Same scope, not just equal contents.
    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Scope for Context {
    fn get(&self, key: &str) -> Option<Value> {
        let mut scope = Some(self);
        while let Some(cx) = scope {
            if let Some(v) = cx.own(key) {
                return Some(v);
            }
            scope = cx.0.proto.as_ref();
        }
        None
    }

    fn own(&self, key: &str) -> Option<Value> {
        self.0.data.borrow().get(key).cloned()
    }

    fn branch(&self, isolate: bool) -> Self {
        self.branch_with_parent(isolate, None)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.0.id)
            .field("root", &self.root().id())
            .field("parent", &self.parent().map(Context::id))
            .field("isolated", &self.0.isolated)
            .field("data", &self.0.data.borrow())
            .finish()
    }
}
