//! Error types shared across the crate.

use thiserror::Error;

use crate::render::RenderHandle;
use crate::rule::RuleId;
use crate::sheet::SheetId;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by rule, sheet and engine operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The style input could not be deep-cloned into a [`StyleMap`](crate::StyleMap).
    #[error(transparent)]
    Clone(#[from] CloneError),

    /// A registered plugin failed while processing a freshly created rule.
    ///
    /// Plugins registered after `index` did not run.
    #[error("plugin #{index} failed: {cause}")]
    Plugin { index: usize, cause: anyhow::Error },

    /// A render-dependent operation was called without a configured renderer.
    #[error("no renderer available for `{operation}`")]
    RendererUnavailable { operation: &'static str },

    /// The rendering backend rejected an operation.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// No rule with this id exists in the sheet.
    #[error("unknown rule {0}")]
    UnknownRule(RuleId),

    /// No sheet with this id exists in the registry.
    #[error("unknown style sheet {0}")]
    UnknownSheet(SheetId),

    /// A declarations document could not be read or parsed.
    #[error(transparent)]
    Declarations(#[from] DeclarationsError),
}

/// Reasons a style object cannot be represented as a [`StyleMap`](crate::StyleMap).
#[derive(Debug, Error)]
pub enum CloneError {
    /// Serializing the caller's value failed (e.g. a map with non-string keys).
    #[error("style could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The style serialized to something other than a map.
    #[error("style must serialize to a map, found {found}")]
    NotAMap { found: &'static str },

    /// A property holds a value kind that has no CSS representation.
    ///
    /// Non-finite numbers serialize to `null` and end up here.
    #[error("property `{path}` holds an unsupported {kind} value")]
    Unrepresentable { path: String, kind: &'static str },
}

/// Errors reported by a [`Renderer`](crate::Renderer) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The handle does not refer to a live binding (stale or foreign).
    #[error("render handle {0} is not live")]
    UnknownHandle(RenderHandle),

    /// The rule has no owning sheet, so there is no target to render into.
    #[error("rule {0} has no render target")]
    NoTarget(RuleId),

    /// The backend has no target registered for this sheet.
    #[error("style sheet {0} is not attached to a render target")]
    UnknownTarget(SheetId),

    /// Any other backend failure.
    #[error("renderer failure: {0}")]
    Backend(String),
}

/// Errors loading [`Declarations`](crate::Declarations).
#[derive(Debug, Error)]
pub enum DeclarationsError {
    #[error("invalid YAML declarations: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON declarations: {0}")]
    Json(#[from] serde_json::Error),

    #[error("declarations must be a map of name to style, found {found}")]
    NotAMap { found: &'static str },

    #[error("failed to read declarations from {path}: {message}")]
    Read { path: String, message: String },
}
