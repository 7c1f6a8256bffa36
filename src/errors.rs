use thiserror::Error;

use crate::parser::ParseError;

/// Everything the engine can fail with.
///
/// `DirectiveSyntax` and `DirectiveData` are gated by the `throwOnError`
/// setting: with it off they are logged and the directive is skipped.
/// The other kinds always reach the caller.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// The document cannot answer the selector queries the engine needs.
    #[error("[markup] {0}")]
    EnvironmentUnsupported(String),

    /// Missing, duplicated or empty template root, or bad init input.
    #[error("[markup] {0}")]
    Configuration(String),

    /// `compile()` or `render()` before a successful `init()`.
    #[error("[markup] init must be called before trying to compile")]
    UninitializedUse,

    /// A directive action string that does not follow its mini-language.
    #[error("[markup] {0}")]
    DirectiveSyntax(String),

    /// A directive referencing missing or ill-typed context data.
    #[error("[markup] {0}")]
    DirectiveData(String),

    /// Markup or selector text that could not be parsed.
    #[error("[markup] parse error: {0}")]
    Parse(String),

    #[error("[markup] invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarkupError {
    /// Whether the `throwOnError` setting decides if this error is raised.
    pub fn is_policy_gated(&self) -> bool {
        matches!(
            self,
            MarkupError::DirectiveSyntax(_) | MarkupError::DirectiveData(_)
        )
    }
}

impl From<ParseError> for MarkupError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::InvalidSyntax(msg) => MarkupError::Parse(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarkupError>;
