//! Error types for the shared primitives.

/// Errors from parsing shared primitives.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unknown priority '{0}' (expected urgent, high, medium, or low)")]
    UnknownPriority(String),
}
