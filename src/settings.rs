//! Engine configuration: the process-wide directive prefix, per-engine
//! [`Settings`] and the [`Options`] passed to `init`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::directives::Directive;
use crate::errors::{MarkupError, Result};

pub const DEFAULT_PREFIX: &str = "mu";

/// Environment variable consulted once for the directive prefix.
pub const PREFIX_ENV: &str = "MARKUP_PREFIX";

static PREFIX: OnceLock<String> = OnceLock::new();

/// The directive attribute prefix, fixed on first use.
pub fn prefix() -> &'static str {
    PREFIX.get_or_init(|| {
        std::env::var(PREFIX_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
    })
}

/// Overrides the prefix. Returns `false` once the prefix has been read or
/// set already.
pub fn set_prefix(prefix: impl Into<String>) -> bool {
    PREFIX.set(prefix.into()).is_ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Raise directive syntax/data errors instead of logging and skipping.
    #[serde(default)]
    pub throw_on_error: bool,
    /// Keys the engine does not know about, kept as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Merges option keys over the current settings. Nothing changes when
    /// the merged result does not deserialize.
    pub fn merge(&mut self, options: Map<String, Value>) -> Result<()> {
        let mut merged = match serde_json::to_value(&*self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(options);
        *self = serde_json::from_value(Value::Object(merged))
            .map_err(|e| MarkupError::Configuration(format!("invalid settings: {e}")))?;
        Ok(())
    }
}

/// What `Engine::init` accepts besides the data.
#[derive(Clone, Default)]
pub struct Options {
    specials: Vec<Arc<dyn Directive>>,
    settings: Map<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extra directive, replacing a built-in of the same name.
    pub fn special<D: Directive + 'static>(mut self, directive: D) -> Self {
        self.specials.push(Arc::new(directive));
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn throw_on_error(self, on: bool) -> Self {
        self.setting("throwOnError", on)
    }

    /// Settings from a JSON object. Directives cannot be expressed in JSON,
    /// so a `specials` key is rejected.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(settings) if settings.contains_key("specials") => Err(
                MarkupError::Configuration("specials must be registered in code, not JSON".into()),
            ),
            Value::Object(settings) => Ok(Self {
                specials: Vec::new(),
                settings,
            }),
            other => Err(MarkupError::Configuration(format!(
                "options must be a JSON object, got {other}"
            ))),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<Arc<dyn Directive>>, Map<String, Value>) {
        (self.specials, self.settings)
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("specials", &self.specials.iter().map(|d| d.name()).collect::<Vec<_>>())
            .field("settings", &self.settings)
            .finish()
    }
}
