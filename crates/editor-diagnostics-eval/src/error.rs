//! Error types for evaluator integration.

use editor_diagnostics::ChangeError;
use thiserror::Error;

/// Errors raised while wiring an evaluator into a diagnostics session.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A failure list or session configuration was not valid JSON for its schema.
    #[error("failed to decode JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// An output format name that is not `json`, `yaml` or `toml`.
    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    /// An edit did not fit the session's document.
    #[error(transparent)]
    Change(#[from] ChangeError),
}
