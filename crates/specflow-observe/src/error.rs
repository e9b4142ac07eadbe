//! Errors from the view layer.

use thiserror::Error;

use specflow_lifecycle::LifecycleError;

/// Convenience alias for results within the observe crate.
pub type Result<T> = std::result::Result<T, ObserveError>;

/// Errors that can occur during view rendering.
#[derive(Debug, Error)]
pub enum ObserveError {
    #[error("unknown view: '{name}'. Available views: summary, stories, history, approvals, compare, journal")]
    UnknownView { name: String },

    #[error("the compare view needs a comparison; pass --from/--to or snapshot the spec first")]
    NoComparison,

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
